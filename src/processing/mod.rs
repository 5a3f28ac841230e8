//! Table restructuring stages that run after type inference.
//!
//! - [`split_mixed_numeric()`]: splits partly-numeric text columns into two derived columns
//! - [`optimize_storage()`]: downcasts numeric columns to the smallest lossless width
//!
//! Both consume a [`crate::types::Table`] and return the transformed table. Row count is
//! preserved by both; only splitting changes the column count.

pub mod optimize;
pub mod split;

pub use optimize::{downcast, optimize_storage};
pub use split::{split_column, split_mixed_numeric};
