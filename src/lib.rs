//! `tabular-infer` loads CSV and Excel files into an in-memory [`types::Table`] and works out
//! what each text column really holds.
//!
//! The primary entrypoint is [`pipeline::process_file`], which reads the file (format
//! auto-detected from the extension) and runs three stages:
//!
//! 1. [`inference`]: converts text columns to numeric, boolean, datetime or categorical
//! 2. [`processing::split_mixed_numeric`]: splits partly-numeric text columns in two
//! 3. [`processing::optimize_storage`]: narrows numeric storage without changing values
//!
//! ## Inputs
//!
//! - **CSV**: `.csv`
//! - **Excel/workbooks** (Cargo feature `excel`, on by default): `.xlsx`, `.xls`, `.xlsm`,
//!   `.xlsb`, `.ods`
//!
//! Empty cells and the usual missing-value markers (`NA`, `null`, `NaN`, ...) load as nulls.
//!
//! ## Quick example: process a file
//!
//! ```no_run
//! use tabular_infer::pipeline::{process_file, ProcessOptions};
//!
//! if let Some(table) = process_file("sales.csv", &ProcessOptions::default()) {
//!     println!("{}", table.schema());
//! }
//! ```
//!
//! ## Processing an in-memory table
//!
//! ```rust
//! use tabular_infer::inference::{HeadSampler, InferenceOptions};
//! use tabular_infer::observability::Diagnostics;
//! use tabular_infer::pipeline::process_table;
//! use tabular_infer::types::{Column, ColumnData, DataType, Table};
//!
//! let table = Table::new(vec![
//!     Column::new("qty", ColumnData::from_strs(&[Some("1"), Some("2"), Some("3")])),
//!     Column::new("code", ColumnData::from_strs(&[Some("10"), Some("n/a"), Some("x")])),
//! ])
//! .unwrap();
//!
//! let out = process_table(
//!     table,
//!     &InferenceOptions::default(),
//!     &mut HeadSampler,
//!     &Diagnostics::default(),
//! );
//! assert_eq!(out.column("qty").unwrap().data_type(), DataType::Int8);
//! let names: Vec<&str> = out.column_names().collect();
//! assert_eq!(names, vec!["qty", "code_numeric", "code_non_numeric"]);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: file loading (CSV, Excel)
//! - [`predicates`]: value-level numeric and date checks
//! - [`inference`]: per-column type detection and conversion
//! - [`processing`]: mixed-column splitting and storage downcasting
//! - [`stats`]: read-only per-column statistics
//! - [`pipeline`]: the end-to-end facade
//! - [`observability`]: pipeline events and observers
//! - [`export`]: CSV output
//! - [`types`]: table, column and schema types
//! - [`error`]: error types

pub mod error;
pub mod export;
pub mod inference;
pub mod ingestion;
pub mod observability;
pub mod pipeline;
pub mod predicates;
pub mod processing;
pub mod stats;
pub mod types;

pub use error::{InferenceError, InferenceResult};
