//! Whole-column conversions applied once a rule has matched.
//!
//! Conversions are lossy but total: a cell that fails to convert becomes null.

use crate::predicates::{parse_datetime, parse_integer, parse_numeric};
use crate::types::{CategoricalData, ColumnData};

/// Canonical truthy/falsy tokens and their boolean meaning.
pub const BOOLEAN_TOKENS: &[(&str, bool)] = &[
    ("True", true),
    ("False", false),
    ("1", true),
    ("0", false),
    ("Yes", true),
    ("No", false),
    ("Y", true),
    ("N", false),
];

/// Boolean meaning of an exact canonical token.
pub fn boolean_token(raw: &str) -> Option<bool> {
    BOOLEAN_TOKENS
        .iter()
        .find(|(token, _)| *token == raw)
        .map(|(_, b)| *b)
}

/// Parse every cell as a number.
///
/// The result is `Int64` when every parseable cell is an integer literal, `Float64` otherwise.
/// A parsed `NaN` is stored as null.
pub fn to_numeric(values: &[Option<String>]) -> ColumnData {
    let all_integral = values
        .iter()
        .flatten()
        .filter(|v| parse_numeric(v).is_some())
        .all(|v| parse_integer(v).is_some());

    if all_integral {
        ColumnData::Int64(
            values
                .iter()
                .map(|v| v.as_deref().and_then(parse_integer))
                .collect(),
        )
    } else {
        ColumnData::Float64(
            values
                .iter()
                .map(|v| v.as_deref().and_then(parse_numeric).filter(|f| !f.is_nan()))
                .collect(),
        )
    }
}

/// Map cells through [`BOOLEAN_TOKENS`]; anything else becomes null.
pub fn to_boolean(values: &[Option<String>]) -> ColumnData {
    ColumnData::Bool(
        values
            .iter()
            .map(|v| v.as_deref().and_then(boolean_token))
            .collect(),
    )
}

/// Parse every cell with [`parse_datetime`]; unparseable cells become null.
pub fn to_datetime(values: &[Option<String>]) -> ColumnData {
    ColumnData::DateTime(
        values
            .iter()
            .map(|v| v.as_deref().and_then(parse_datetime))
            .collect(),
    )
}

/// Dictionary-encode the cells, keeping the original strings as labels.
pub fn to_categorical(values: &[Option<String>]) -> ColumnData {
    ColumnData::Categorical(CategoricalData::from_values(values))
}
