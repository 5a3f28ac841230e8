use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type used across the crate.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Error type returned by ingestion, table construction and export.
///
/// Value-level parse failures never show up here: predicates collapse them to `false` and
/// conversions turn them into nulls.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The path extension does not map to a supported input format.
    #[error("unsupported file format '{extension}' ({path}); use CSV or Excel files")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file could not be read or parsed.
    #[error("error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ReadErrorKind,
    },

    /// A column name is already used in the table.
    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: String },

    /// Columns of a table must all have the same number of rows.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedTable {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Writing the processed table failed.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    /// Underlying I/O error outside of reading the input (e.g. creating the output directory).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Underlying cause of an [`InferenceError::Read`].
#[derive(Debug, Error)]
pub enum ReadErrorKind {
    /// File not found, permission denied, ...
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Workbook could not be opened or decoded (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The workbook has no sheets or the selected sheet has no header row.
    #[error("workbook has no data: {message}")]
    EmptyWorkbook { message: String },

    /// The requested sheet does not exist.
    #[error("sheet '{0}' not found")]
    MissingSheet(String),

    /// The decoded cells could not form a table.
    #[error("malformed input: {message}")]
    Malformed { message: String },

    /// Ingestion of this format was compiled out.
    #[error("{0} ingestion not enabled")]
    FeatureDisabled(&'static str),
}

impl InferenceError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: impl Into<ReadErrorKind>) -> Self {
        Self::Read {
            path: path.into(),
            source: source.into(),
        }
    }
}
