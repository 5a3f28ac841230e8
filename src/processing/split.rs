//! Mixed-value splitting for text columns that are partly numeric.

use crate::inference::convert::to_numeric;
use crate::observability::{Diagnostics, PipelineEvent, Stage};
use crate::predicates::parse_numeric;
use crate::types::{Column, ColumnData, Table};

/// Suffix of the numeric half of a split column.
pub const NUMERIC_SUFFIX: &str = "_numeric";
/// Suffix of the residue half of a split column.
pub const NON_NUMERIC_SUFFIX: &str = "_non_numeric";

/// Split every text column whose non-null values are partly (not fully) numeric.
///
/// `<name>` is replaced, at the same position, by:
///
/// - `<name>_numeric`: parsed numbers, null where parsing failed
/// - `<name>_non_numeric`: original strings where parsing failed, null elsewhere
///
/// Columns that are fully numeric or fully non-numeric are left untouched. A column whose
/// derived names are already taken is left untouched as well (reported as a warning).
pub fn split_mixed_numeric(mut table: Table, diagnostics: &Diagnostics) -> Table {
    diagnostics.emit(PipelineEvent::StageStarted {
        stage: Stage::MixedSplit,
    });

    let mut idx = 0;
    while idx < table.column_count() {
        let column = &table.columns()[idx];
        let Some((numeric, non_numeric)) = split_column(column) else {
            idx += 1;
            continue;
        };

        let source = column.name.clone();
        let numeric_name = numeric.name.clone();
        let non_numeric_name = non_numeric.name.clone();
        match table.splice_column(idx, vec![numeric, non_numeric]) {
            Ok(()) => {
                diagnostics.emit(PipelineEvent::ColumnSplit {
                    column: source,
                    numeric: numeric_name,
                    non_numeric: non_numeric_name,
                });
                idx += 2;
            }
            Err(e) => {
                diagnostics.emit(PipelineEvent::ColumnSplitSkipped {
                    column: source,
                    reason: e.to_string(),
                });
                idx += 1;
            }
        }
    }

    table
}

/// The two derived columns for a mixed text column, or `None` if `column` is not mixed.
pub fn split_column(column: &Column) -> Option<(Column, Column)> {
    let ColumnData::Utf8(values) = &column.data else {
        return None;
    };

    let mut non_null = 0usize;
    let mut numeric = 0usize;
    for v in values.iter().flatten() {
        non_null += 1;
        if parse_numeric(v).is_some() {
            numeric += 1;
        }
    }
    if numeric == 0 || numeric == non_null {
        return None;
    }

    let residue: Vec<Option<String>> = values
        .iter()
        .map(|v| v.as_ref().filter(|s| parse_numeric(s).is_none()).cloned())
        .collect();

    Some((
        Column::new(format!("{}{NUMERIC_SUFFIX}", column.name), to_numeric(values)),
        Column::new(
            format!("{}{NON_NUMERIC_SUFFIX}", column.name),
            ColumnData::Utf8(residue),
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::new(name, ColumnData::from_strs(values))
    }

    #[test]
    fn mixed_column_splits_into_numeric_and_residue() {
        let table = Table::new(vec![
            text("id", &[Some("a"), Some("b"), Some("c"), Some("d"), Some("e")]),
            text("col", &[Some("123"), Some("abc"), Some("456"), Some("xyz"), Some("789")]),
        ])
        .unwrap();

        let out = split_mixed_numeric(table, &Diagnostics::default());

        let names: Vec<&str> = out.column_names().collect();
        assert_eq!(names, vec!["id", "col_numeric", "col_non_numeric"]);
        assert_eq!(
            out.column("col_numeric").unwrap().data,
            ColumnData::Int64(vec![Some(123), None, Some(456), None, Some(789)])
        );
        assert_eq!(
            out.column("col_non_numeric").unwrap().data,
            ColumnData::from_strs(&[None, Some("abc"), None, Some("xyz"), None])
        );
        assert_eq!(out.row_count(), 5);
    }

    #[test]
    fn pure_columns_are_never_split() {
        let table = Table::new(vec![
            text("all_numeric", &[Some("1"), Some("2.5"), None]),
            text("no_numeric", &[Some("a"), Some("b"), None]),
            text("empty", &[None, None, None]),
            Column::new("typed", ColumnData::Int64(vec![Some(1), Some(2), Some(3)])),
        ])
        .unwrap();
        let before = table.clone();
        let out = split_mixed_numeric(table, &Diagnostics::default());
        assert_eq!(out, before);
    }

    #[test]
    fn nulls_stay_null_in_both_halves() {
        let column = text("c", &[Some("1.5"), None, Some("n/a")]);
        let (numeric, residue) = split_column(&column).unwrap();
        assert_eq!(numeric.data_type(), DataType::Float64);
        assert_eq!(numeric.data, ColumnData::Float64(vec![Some(1.5), None, None]));
        assert_eq!(residue.data, ColumnData::from_strs(&[None, None, Some("n/a")]));
    }

    #[test]
    fn name_collision_leaves_column_untouched() {
        let table = Table::new(vec![
            text("x", &[Some("1"), Some("a")]),
            text("x_numeric", &[Some("q"), Some("r")]),
        ])
        .unwrap();
        let out = split_mixed_numeric(table.clone(), &Diagnostics::default());
        assert_eq!(out, table);
    }
}
