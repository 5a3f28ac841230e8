//! Date/time parsing.
//!
//! Two entrypoints:
//!
//! - [`parse_fuzzy`]: scans a free-form string for date/time components and ignores every token
//!   it does not recognise ("Meeting on March 3 2020 at noon" parses as 2020-03-03).
//! - [`parse_datetime`]: best-effort conversion used when a column is turned into datetimes.
//!   Well-known layouts are tried first, then the fuzzy scanner.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

const DATETIME_FORMATS: &[&str] = &[
    // ISO formats
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    // US formats
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    // EU formats
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("mon", Weekday::Mon),
    ("monday", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("tues", Weekday::Tue),
    ("tuesday", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("wednesday", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("thur", Weekday::Thu),
    ("thurs", Weekday::Thu),
    ("thursday", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("friday", Weekday::Fri),
    ("sat", Weekday::Sat),
    ("saturday", Weekday::Sat),
    ("sun", Weekday::Sun),
    ("sunday", Weekday::Sun),
];

/// Best-effort conversion of a cell to a timestamp.
///
/// Returns `None` for empty or unparseable input; callers store that as null.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    parse_fuzzy(trimmed, Local::now().date_naive())
}

/// Scan `raw` for date/time components, skipping unknown tokens.
///
/// Components missing from the input are taken from `default` (date) or midnight (time).
/// Fails when nothing date-like is found, when a component appears twice with different values,
/// or when the result is not a valid calendar date.
pub fn parse_fuzzy(raw: &str, default: NaiveDate) -> Option<NaiveDateTime> {
    let tokens: Vec<String> = tokenize(raw)
        .into_iter()
        .map(|t| t.trim_end_matches('.').to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut parts = DateParts::default();
    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1).map(String::as_str);
        parts.scan_token(token, next)?;
    }
    parts.resolve(default)
}

/// Split on whitespace and punctuation. A comma between two digits stays inside the token, so
/// `1,000` is one (non-date) token rather than `1` and `000`.
fn tokenize(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let is_digit_at = |i: Option<usize>| i.and_then(|i| bytes.get(i)).is_some_and(u8::is_ascii_digit);

    let mut tokens = Vec::new();
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        let separator = match c {
            ',' => !(is_digit_at(i.checked_sub(1)) && is_digit_at(Some(i + 1))),
            ';' | '(' | ')' | '[' | ']' | '"' => true,
            c => c.is_whitespace(),
        };
        if separator {
            tokens.push(&raw[start..i]);
            start = i + c.len_utf8();
        }
    }
    tokens.push(&raw[start..]);
    tokens
}

#[derive(Debug, Default)]
struct DateParts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    nanos: Option<u32>,
    weekday: Option<Weekday>,
    /// Bare small numbers whose role (day/month/two-digit year) is decided at the end.
    loose: Vec<u32>,
}

impl DateParts {
    /// `None` means the input is contradictory and parsing must stop.
    fn scan_token(&mut self, token: &str, next: Option<&str>) -> Option<()> {
        if let Some((date, time)) = split_iso_t(token) {
            self.scan_token(date, None)?;
            return self.scan_token(time, None);
        }

        match token {
            "am" | "a.m" => return self.apply_meridiem(false),
            "pm" | "p.m" => return self.apply_meridiem(true),
            _ => {}
        }

        if let Some(month) = month_from_name(token) {
            return set_once(&mut self.month, month);
        }

        if let Some(weekday) = weekday_from_name(token) {
            return set_once(&mut self.weekday, weekday);
        }

        if token.contains(':') {
            return self.scan_time(token);
        }

        if let Some(body) = token.strip_suffix("am").or_else(|| token.strip_suffix("pm")) {
            if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
                let hour: u32 = body.parse().ok()?;
                set_once(&mut self.hour, hour)?;
                return self.apply_meridiem(token.ends_with("pm"));
            }
        }

        if let Some(day) = ordinal_day(token) {
            return set_once(&mut self.day, day);
        }

        if token.contains(['-', '/', '.']) {
            return self.scan_date_group(token);
        }

        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            return self.scan_number(token, next);
        }

        // Unknown word: skipped.
        Some(())
    }

    fn scan_number(&mut self, token: &str, next: Option<&str>) -> Option<()> {
        if matches!(next, Some("am" | "pm" | "a.m" | "p.m")) && token.len() <= 2 {
            let hour: u32 = token.parse().ok()?;
            return set_once(&mut self.hour, hour);
        }
        match token.len() {
            1 | 2 => {
                let n: u32 = token.parse().ok()?;
                if n > 31 {
                    set_once(&mut self.year, two_digit_year(n))
                } else {
                    self.loose.push(n);
                    Some(())
                }
            }
            4 => set_once(&mut self.year, token.parse().ok()?),
            8 => {
                let year = token[..4].parse().ok()?;
                let month = token[4..6].parse().ok()?;
                let day = token[6..].parse().ok()?;
                self.set_date(year, month, day)
            }
            _ => Some(()),
        }
    }

    fn scan_date_group(&mut self, token: &str) -> Option<()> {
        let sep = if token.contains('-') {
            '-'
        } else if token.contains('/') {
            '/'
        } else {
            '.'
        };
        let pieces: Vec<&str> = token.split(sep).collect();
        let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        match pieces.as_slice() {
            [a, b, c] if numeric(a) && numeric(b) && numeric(c) => {
                let (a_n, b_n, c_n): (u32, u32, u32) =
                    (a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
                if a.len() == 4 {
                    self.set_date(a_n as i32, b_n, c_n)
                } else {
                    let year = if c.len() <= 2 {
                        two_digit_year(c_n)
                    } else {
                        c_n as i32
                    };
                    if a_n > 12 && b_n <= 12 {
                        self.set_date(year, b_n, a_n)
                    } else {
                        self.set_date(year, a_n, b_n)
                    }
                }
            }
            [a, m, c] if numeric(a) && numeric(c) => match month_from_name(m) {
                Some(month) => {
                    let (day, year) = (a.parse().ok()?, c.parse().ok()?);
                    let year = if c.len() <= 2 { two_digit_year(year) } else { year as i32 };
                    self.set_date(year, month, day)
                }
                None => Some(()),
            },
            [a, b] if sep == '/' && numeric(a) && numeric(b) => {
                set_once(&mut self.month, a.parse().ok()?)?;
                set_once(&mut self.day, b.parse().ok()?)
            }
            _ => Some(()),
        }
    }

    fn scan_time(&mut self, token: &str) -> Option<()> {
        let (token, meridiem) = match token
            .strip_suffix("am")
            .map(|t| (t, Some(false)))
            .or_else(|| token.strip_suffix("pm").map(|t| (t, Some(true))))
        {
            Some(stripped) => stripped,
            None => (token, None),
        };
        // Drop a trailing zone designator: `Z`, `+02:00`, `-0500`.
        let clock = token
            .trim_end_matches('z')
            .split(['+', '-'])
            .next()
            .unwrap_or("");
        let pieces: Vec<&str> = clock.split(':').collect();
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        let (hour, minute, second, nanos) = match pieces.as_slice() {
            [h, m] if digits(h) && digits(m) => (h.parse().ok()?, m.parse().ok()?, 0, 0),
            [h, m, s] if digits(h) && digits(m) => {
                let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
                if !digits(whole) || !(frac.is_empty() || digits(frac)) {
                    return Some(());
                }
                (h.parse().ok()?, m.parse().ok()?, whole.parse().ok()?, fraction_nanos(frac))
            }
            // Not a clock reading (e.g. "note:"); skipped.
            _ => return Some(()),
        };
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        set_once(&mut self.hour, hour)?;
        set_once(&mut self.minute, minute)?;
        set_once(&mut self.second, second)?;
        set_once(&mut self.nanos, nanos)?;
        match meridiem {
            Some(pm) => self.apply_meridiem(pm),
            None => Some(()),
        }
    }

    /// A meridiem without a 1..=12 hour before it is an ordinary word ("I am").
    fn apply_meridiem(&mut self, pm: bool) -> Option<()> {
        let Some(hour) = self.hour.filter(|h| (1..=12).contains(h)) else {
            return Some(());
        };
        self.hour = Some(match (pm, hour) {
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, 12) => 0,
            (false, h) => h,
        });
        Some(())
    }

    fn set_date(&mut self, year: i32, month: u32, day: u32) -> Option<()> {
        set_once(&mut self.year, year)?;
        set_once(&mut self.month, month)?;
        set_once(&mut self.day, day)
    }

    fn resolve(mut self, default: NaiveDate) -> Option<NaiveDateTime> {
        let mut loose = std::mem::take(&mut self.loose).into_iter();

        if self.month.is_none() && loose.len() >= 2 {
            let first = loose.next()?;
            let second = loose.next()?;
            let (month, day) = if first > 12 { (second, first) } else { (first, second) };
            set_once(&mut self.month, month)?;
            set_once(&mut self.day, day)?;
        }
        for n in loose {
            if self.day.is_none() {
                self.day = Some(n);
            } else if self.year.is_none() {
                self.year = Some(two_digit_year(n));
            }
        }

        let found = self.year.is_some()
            || self.month.is_some()
            || self.day.is_some()
            || self.hour.is_some()
            || self.weekday.is_some();
        if !found {
            return None;
        }

        let year = self.year.unwrap_or_else(|| default.year());
        let month = self.month.unwrap_or_else(|| default.month());
        let date = match self.day {
            Some(day) => NaiveDate::from_ymd_opt(year, month, day)?,
            None => {
                let date = clamped_date(year, month, default.day())?;
                // Without an explicit day a weekday moves forward to its next occurrence.
                match self.weekday {
                    Some(weekday) => next_weekday(date, weekday)?,
                    None => date,
                }
            }
        };
        let time = NaiveTime::from_hms_nano_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.nanos.unwrap_or(0),
        )?;
        Some(date.and_time(time))
    }
}

fn set_once<T: PartialEq + Copy>(slot: &mut Option<T>, value: T) -> Option<()> {
    match slot {
        Some(existing) if *existing != value => None,
        _ => {
            *slot = Some(value);
            Some(())
        }
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, month)| *month)
}

fn weekday_from_name(token: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, weekday)| *weekday)
}

/// `date` itself when it already falls on `weekday`.
fn next_weekday(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(ahead)))
}

fn ordinal_day(token: &str) -> Option<u32> {
    let body = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))?;
    if body.is_empty() || body.len() > 2 || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    body.parse().ok().filter(|d| (1..=31).contains(d))
}

/// `2020-03-03t12:00` → (`2020-03-03`, `12:00`).
fn split_iso_t(token: &str) -> Option<(&str, &str)> {
    let (date, time) = token.split_once('t')?;
    let starts_digit = |s: &str| s.bytes().next().is_some_and(|b| b.is_ascii_digit());
    (starts_digit(date) && starts_digit(time) && date.contains('-') && time.contains(':'))
        .then_some((date, time))
}

fn two_digit_year(n: u32) -> i32 {
    match n {
        0..=68 => 2000 + n as i32,
        69..=99 => 1900 + n as i32,
        _ => n as i32,
    }
}

fn fraction_nanos(frac: &str) -> u32 {
    let digits: String = frac.chars().take(9).collect();
    if digits.is_empty() {
        return 0;
    }
    let scale = 10u32.pow(9 - digits.len() as u32);
    digits.parse::<u32>().map(|n| n * scale).unwrap_or(0)
}

/// First day-of-month ≤ `day` that exists in `year`-`month`.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}
