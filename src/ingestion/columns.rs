//! Reader-level column typing shared by the CSV and Excel readers.
//!
//! Readers hand over raw cells per column; a column is typed only when *every* non-empty cell
//! agrees (all integers, all numbers, all `true`/`false` spellings, all timestamps). Anything
//! else loads as text and is left to [`crate::inference`].

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::error::ReadErrorKind;
use crate::predicates::{parse_integer, parse_numeric};
use crate::types::{Column, ColumnData, Table, DATETIME_DISPLAY_FORMAT};

/// Text cells treated as missing when loading a file.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

/// One cell as delivered by a reader.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawCell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl RawCell {
    /// Trim text and map missing-value markers to [`RawCell::Empty`].
    pub(crate) fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NA_VALUES.contains(&trimmed) {
            Self::Empty
        } else {
            Self::Text(trimmed.to_owned())
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(true) => Some("True".to_string()),
            Self::Bool(false) => Some("False".to_string()),
            Self::DateTime(dt) => Some(dt.format(DATETIME_DISPLAY_FORMAT).to_string()),
        }
    }
}

/// Build a table from a header row and column-major raw cells.
///
/// Blank headers become `Unnamed: <i>`; repeated headers get `.1`, `.2`, ... suffixes.
pub(crate) fn build_table(
    headers: Vec<String>,
    columns: Vec<Vec<RawCell>>,
) -> Result<Table, ReadErrorKind> {
    let names = unique_headers(headers);
    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::new(name, type_column(cells)))
        .collect();
    Table::new(columns).map_err(|e| ReadErrorKind::Malformed {
        message: e.to_string(),
    })
}

/// Suffix repeats with `.1`, `.2`, ... until the name is unused, so `a, a, a.1` never collides.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let mut name = match h.trim() {
                "" => format!("Unnamed: {i}"),
                trimmed => trimmed.to_owned(),
            };
            let mut cur = counts.get(&name).copied().unwrap_or(0);
            while cur > 0 {
                counts.insert(name.clone(), cur + 1);
                name = format!("{name}.{cur}");
                cur = counts.get(&name).copied().unwrap_or(0);
            }
            *counts.entry(name.clone()).or_insert(0) += 1;
            name
        })
        .collect()
}

fn type_column(cells: Vec<RawCell>) -> ColumnData {
    let present = || cells.iter().filter(|c| !matches!(c, RawCell::Empty));
    if present().next().is_none() {
        return ColumnData::Utf8(vec![None; cells.len()]);
    }

    if present().all(|c| as_integer(c).is_some()) {
        return ColumnData::Int64(cells.iter().map(as_integer).collect());
    }
    if present().all(|c| as_float(c).is_some()) {
        return ColumnData::Float64(cells.iter().map(as_float).collect());
    }
    if present().all(|c| as_bool(c).is_some()) {
        return ColumnData::Bool(cells.iter().map(as_bool).collect());
    }
    if present().all(|c| matches!(c, RawCell::DateTime(_))) {
        return ColumnData::DateTime(
            cells
                .iter()
                .map(|c| match c {
                    RawCell::DateTime(dt) => Some(*dt),
                    _ => None,
                })
                .collect(),
        );
    }

    ColumnData::Utf8(cells.iter().map(RawCell::to_text).collect())
}

fn as_integer(cell: &RawCell) -> Option<i64> {
    match cell {
        RawCell::Int(i) => Some(*i),
        RawCell::Text(s) => parse_integer(s),
        _ => None,
    }
}

fn as_float(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Int(i) => Some(*i as f64),
        RawCell::Float(f) => Some(*f),
        RawCell::Text(s) => parse_numeric(s),
        _ => None,
    }
}

fn as_bool(cell: &RawCell) -> Option<bool> {
    match cell {
        RawCell::Bool(b) => Some(*b),
        RawCell::Text(s) if TRUE_VALUES.contains(&s.as_str()) => Some(true),
        RawCell::Text(s) if FALSE_VALUES.contains(&s.as_str()) => Some(false),
        _ => None,
    }
}
