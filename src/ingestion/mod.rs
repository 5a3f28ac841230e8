//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`read_table`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - loads the file into an in-memory [`crate::types::Table`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)

mod columns;
pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod unified;

pub use columns::NA_VALUES;
pub use unified::{read_table, IngestionFormat, IngestionOptions, SheetSelection};
