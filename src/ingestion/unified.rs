//! Unified ingestion entrypoint.
//!
//! Most callers should use [`read_table`], which loads a file into an in-memory
//! [`crate::types::Table`].
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension
//!   (case-insensitive). Unknown or missing extensions fail before the file is touched.
//! - Excel inputs read a single sheet, chosen by [`IngestionOptions::sheet`].

use std::path::Path;

use crate::error::{InferenceError, InferenceResult};
use crate::types::Table;

use super::csv;

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Infer the format of `path`, or fail with [`InferenceError::UnsupportedFormat`].
    pub fn from_path(path: &Path) -> InferenceResult<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| InferenceError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext.to_string(),
        })
    }
}

/// Which sheet to read from an Excel workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// The first sheet (default).
    #[default]
    First,
    /// A single named sheet.
    Sheet(String),
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Excel-specific options.
    pub sheet: SheetSelection,
}

/// Load `path` into a [`Table`].
///
/// # Examples
///
/// ```no_run
/// use tabular_infer::ingestion::{read_table, IngestionOptions};
///
/// # fn main() -> Result<(), tabular_infer::InferenceError> {
/// // Uses `.csv` to select CSV ingestion.
/// let table = read_table("people.csv", &IngestionOptions::default())?;
/// println!("rows={} columns={}", table.row_count(), table.column_count());
/// # Ok(())
/// # }
/// ```
///
/// Forcing a sheet (requires the `excel` feature):
///
/// ```no_run
/// use tabular_infer::ingestion::{read_table, IngestionFormat, IngestionOptions, SheetSelection};
///
/// # fn main() -> Result<(), tabular_infer::InferenceError> {
/// let opts = IngestionOptions {
///     format: Some(IngestionFormat::Excel),
///     sheet: SheetSelection::Sheet("Sheet1".to_string()),
/// };
/// let table = read_table("workbook.xlsx", &opts)?;
/// println!("rows={}", table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn read_table(path: impl AsRef<Path>, options: &IngestionOptions) -> InferenceResult<Table> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => IngestionFormat::from_path(path)?,
    };

    match format {
        IngestionFormat::Csv => csv::read_csv_from_path(path),
        IngestionFormat::Excel => read_excel_dispatch(path, &options.sheet),
    }
}

fn read_excel_dispatch(path: &Path, sheet: &SheetSelection) -> InferenceResult<Table> {
    #[cfg(feature = "excel")]
    {
        super::excel::read_excel_from_path(path, sheet)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = sheet;
        Err(InferenceError::read(
            path,
            crate::error::ReadErrorKind::FeatureDisabled("excel"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_map_case_insensitively() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("Xlsx"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_extension("xls"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_extension("txt"), None);
    }

    #[test]
    fn unsupported_extension_fails_before_reading() {
        let err = read_table("missing/data.txt", &IngestionOptions::default()).unwrap_err();
        match err {
            InferenceError::UnsupportedFormat { extension, .. } => assert_eq!(extension, "txt"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }

        let err = read_table("no_extension", &IngestionOptions::default()).unwrap_err();
        assert!(matches!(err, InferenceError::UnsupportedFormat { .. }));
    }
}
