//! Scalar predicates: "is this value numeric?" / "is this value a date?".
//!
//! Predicates never fail. Any parse error, type mismatch or overflow collapses to `false`.

pub mod datetime;

use chrono::Local;

use crate::types::Value;

pub use datetime::{parse_datetime, parse_fuzzy};

/// Parse a text cell as a floating point number (surrounding whitespace allowed).
///
/// Accepts the usual decimal/exponent forms plus `nan`/`inf`, like a float constructor would.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parse a text cell as a 64-bit integer (surrounding whitespace allowed).
pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// `true` if `value` can be read as a floating point number.
///
/// Booleans count as numeric (they coerce to 1.0/0.0); nulls and timestamps do not.
pub fn is_numeric_value(value: &Value) -> bool {
    match value {
        Value::Int64(_) | Value::Float64(_) | Value::Bool(_) => true,
        Value::Utf8(s) => parse_numeric(s).is_some(),
        Value::Null | Value::DateTime(_) => false,
    }
}

/// `true` if the string form of `value` contains a recognisable date/time.
pub fn is_date_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::DateTime(_) => true,
        Value::Utf8(s) => is_date_str(s),
        other => is_date_str(&other.to_string()),
    }
}

pub(crate) fn is_date_str(raw: &str) -> bool {
    parse_fuzzy(raw, Local::now().date_naive()).is_some()
}
