#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{InferenceError, InferenceResult, ReadErrorKind};
use crate::predicates::parse_datetime;
use crate::types::Table;

use super::columns::{build_table, RawCell};
use super::unified::SheetSelection;

/// Load one sheet of an Excel document (`.xlsx`, `.xls`, `.ods`, etc.) into a [`Table`].
///
/// Behavior:
/// - Uses the selected sheet, or the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Keeps native cell types (numbers, booleans, dates); text cells follow CSV rules
pub fn read_excel_from_path(
    path: impl AsRef<Path>,
    sheet: &SheetSelection,
) -> InferenceResult<Table> {
    let path = path.as_ref();
    read_workbook(path, sheet).map_err(|e| InferenceError::read(path, e))
}

fn read_workbook(path: &Path, selection: &SheetSelection) -> Result<Table, ReadErrorKind> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();

    let sheet = match selection {
        SheetSelection::First => names.first().cloned().ok_or_else(|| {
            ReadErrorKind::EmptyWorkbook {
                message: "workbook has no sheets".to_string(),
            }
        })?,
        SheetSelection::Sheet(name) => {
            if !names.iter().any(|n| n == name) {
                return Err(ReadErrorKind::MissingSheet(name.clone()));
            }
            name.clone()
        }
    };

    let range = workbook.worksheet_range(&sheet)?;
    read_sheet_range(&sheet, &range)
}

fn read_sheet_range(sheet: &str, range: &calamine::Range<Data>) -> Result<Table, ReadErrorKind> {
    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let header = rows.next().ok_or_else(|| ReadErrorKind::EmptyWorkbook {
        message: format!("sheet '{sheet}' has no non-empty rows (no header row found)"),
    })?;
    let headers: Vec<String> = header.iter().map(cell_to_header_string).collect();

    let mut columns: Vec<Vec<RawCell>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(row.get(idx).map_or(RawCell::Empty, convert_cell));
        }
    }

    build_table(headers, columns)
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> RawCell {
    match c {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) => RawCell::text(s),
        Data::Int(i) => RawCell::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => RawCell::Int(*f as i64),
        Data::Float(f) => RawCell::Float(*f),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => {
            serial_to_datetime(dt.as_f64()).map_or(RawCell::Empty, RawCell::DateTime)
        }
        Data::DateTime(dt) => RawCell::Float(dt.as_f64()),
        Data::DateTimeIso(s) => parse_datetime(s).map_or_else(|| RawCell::text(s), RawCell::DateTime),
        Data::DurationIso(s) => RawCell::text(s),
    }
}

/// Convert an Excel serial date (1900 date system) to a timestamp.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}
