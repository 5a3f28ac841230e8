//! CSV export of processed tables.

use std::io::Write;
use std::path::Path;

use crate::error::InferenceResult;
use crate::types::Table;

/// Write `table` as comma-delimited text with a header row.
///
/// Nulls are empty fields, booleans `True`/`False`, timestamps `%Y-%m-%d %H:%M:%S`.
pub fn write_csv<W: Write>(table: &Table, wtr: &mut csv::Writer<W>) -> InferenceResult<()> {
    wtr.write_record(table.column_names())?;
    for idx in 0..table.row_count() {
        wtr.write_record(table.row(idx).iter().map(ToString::to_string))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `table` to a new file at `path` (truncating an existing one).
pub fn write_csv_to_path(table: &Table, path: impl AsRef<Path>) -> InferenceResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    write_csv(table, &mut wtr)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::{CategoricalData, Column, ColumnData};

    #[test]
    fn writes_header_and_rendered_values() {
        let when = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        let table = Table::new(vec![
            Column::new("n", ColumnData::Int8(vec![Some(1), None])),
            Column::new("ok", ColumnData::Bool(vec![Some(true), Some(false)])),
            Column::new("at", ColumnData::DateTime(vec![Some(when), None])),
            Column::new(
                "c",
                ColumnData::Categorical(CategoricalData::from_values(&[
                    Some("b, c".to_string()),
                    None,
                ])),
            ),
        ])
        .unwrap();

        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&table, &mut wtr).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "n,ok,at,c\n1,True,2021-03-04 05:06:07,\"b, c\"\n,False,,\n"
        );
    }
}
