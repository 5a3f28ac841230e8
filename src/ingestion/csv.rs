//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{InferenceError, InferenceResult, ReadErrorKind};
use crate::types::Table;

use super::columns::{build_table, RawCell};

/// Load a CSV file into a [`Table`].
///
/// Rules:
///
/// - The first record is the header row.
/// - Cells are trimmed; missing-value markers (see [`super::NA_VALUES`]) become null.
/// - Short records are padded with nulls; extra trailing fields are dropped.
/// - A column whose cells all parse as integers, numbers or `true`/`false` gets that type;
///   everything else is text.
pub fn read_csv_from_path(path: impl AsRef<Path>) -> InferenceResult<Table> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| InferenceError::read(path, e))?;
    read_csv_from_reader(&mut rdr).map_err(|e| InferenceError::read(path, e))
}

/// Load CSV data from an existing CSV reader.
pub fn read_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> Result<Table, ReadErrorKind> {
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    let mut columns: Vec<Vec<RawCell>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(record.get(idx).map_or(RawCell::Empty, RawCell::text));
        }
    }

    build_table(headers, columns)
}
