//! Core data model: a column-oriented in-memory [`Table`].
//!
//! Each [`Column`] owns typed storage ([`ColumnData`]) where every cell may be null. Stages of the
//! pipeline replace a column's storage wholesale, so a column is never observed half-converted.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::mem::size_of;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{InferenceError, InferenceResult};

/// Format used whenever a datetime cell is rendered as text.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logical data type (dtype) of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Untyped text (the "object" dtype). Only these columns are inferred.
    Utf8,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point number.
    Float32,
    /// 64-bit floating point number.
    Float64,
    /// Nullable boolean.
    Bool,
    /// Timestamp without timezone.
    DateTime,
    /// Dictionary-encoded strings.
    Categorical,
}

impl DataType {
    /// Short dtype label, as shown in logs and column statistics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "object",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "boolean",
            Self::DateTime => "datetime64[ns]",
            Self::Categorical => "category",
        }
    }

    /// Any signed integer width.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// `Float32` or `Float64`.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Integer or floating point. Booleans are not numeric here.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered (name, dtype) snapshot of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name, field.data_type)?;
        }
        Ok(())
    }
}

/// A single dynamically typed cell.
///
/// Narrow storage widens on read: every integer width reads as [`Value::Int64`], both float
/// widths as [`Value::Float64`] and categorical labels as [`Value::Utf8`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Timestamp.
    DateTime(NaiveDateTime),
}

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Utf8(s) => f.write_str(s),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_DISPLAY_FORMAT)),
        }
    }
}

/// Dictionary-encoded string storage: sorted distinct labels plus one code per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalData {
    categories: Vec<String>,
    codes: Vec<Option<u32>>,
}

impl CategoricalData {
    /// Encode string cells. Null cells get no code.
    pub fn from_values(values: &[Option<String>]) -> Self {
        let distinct: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();
        let index: BTreeMap<&str, u32> = distinct
            .iter()
            .enumerate()
            .map(|(i, label)| (*label, i as u32))
            .collect();
        let codes = values
            .iter()
            .map(|v| v.as_deref().and_then(|label| index.get(label).copied()))
            .collect();
        let categories = distinct.into_iter().map(str::to_owned).collect();
        Self { categories, codes }
    }

    /// Sorted distinct labels.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// One code per row, indexing [`Self::categories`]; `None` is null.
    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    /// Label of row `idx`, or `None` for null cells.
    pub fn label(&self, idx: usize) -> Option<&str> {
        let code = self.codes.get(idx).copied().flatten()?;
        self.categories.get(code as usize).map(String::as_str)
    }

    /// Decode back to plain string cells.
    pub fn to_values(&self) -> Vec<Option<String>> {
        (0..self.codes.len())
            .map(|i| self.label(i).map(str::to_owned))
            .collect()
    }
}

/// Typed column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Utf8(Vec<Option<String>>),
    Int8(Vec<Option<i8>>),
    Int16(Vec<Option<i16>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    Float32(Vec<Option<f32>>),
    Float64(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Categorical(CategoricalData),
}

impl ColumnData {
    /// Text storage from borrowed cells; handy for building tables by hand.
    pub fn from_strs(values: &[Option<&str>]) -> Self {
        Self::Utf8(values.iter().map(|v| v.map(str::to_owned)).collect())
    }

    /// Logical type of this storage.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Utf8(_) => DataType::Utf8,
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Bool(_) => DataType::Bool,
            Self::DateTime(_) => DataType::DateTime,
            Self::Categorical(_) => DataType::Categorical,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Utf8(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::DateTime(v) => v.len(),
            Self::Categorical(c) => c.codes.len(),
        }
    }

    /// `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads cell `idx`. Out-of-range indexes read as [`Value::Null`].
    pub fn get(&self, idx: usize) -> Value {
        let value = match self {
            Self::Utf8(v) => v.get(idx).cloned().flatten().map(Value::Utf8),
            Self::Int8(v) => v.get(idx).copied().flatten().map(|x| Value::Int64(x.into())),
            Self::Int16(v) => v.get(idx).copied().flatten().map(|x| Value::Int64(x.into())),
            Self::Int32(v) => v.get(idx).copied().flatten().map(|x| Value::Int64(x.into())),
            Self::Int64(v) => v.get(idx).copied().flatten().map(Value::Int64),
            Self::Float32(v) => v.get(idx).copied().flatten().map(|x| Value::Float64(x.into())),
            Self::Float64(v) => v.get(idx).copied().flatten().map(Value::Float64),
            Self::Bool(v) => v.get(idx).copied().flatten().map(Value::Bool),
            Self::DateTime(v) => v.get(idx).copied().flatten().map(Value::DateTime),
            Self::Categorical(c) => c.label(idx).map(|s| Value::Utf8(s.to_owned())),
        };
        value.unwrap_or(Value::Null)
    }

    /// Iterate all cells in row order.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        fn nulls<T>(v: &[Option<T>]) -> usize {
            v.iter().filter(|x| x.is_none()).count()
        }
        match self {
            Self::Utf8(v) => nulls(v),
            Self::Int8(v) => nulls(v),
            Self::Int16(v) => nulls(v),
            Self::Int32(v) => nulls(v),
            Self::Int64(v) => nulls(v),
            Self::Float32(v) => nulls(v),
            Self::Float64(v) => nulls(v),
            Self::Bool(v) => nulls(v),
            Self::DateTime(v) => nulls(v),
            Self::Categorical(c) => nulls(&c.codes),
        }
    }

    /// Number of non-null cells.
    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Estimated deep size in bytes of this storage.
    pub fn memory_usage(&self) -> usize {
        fn slots<T>(v: &[T]) -> usize {
            size_of::<T>() * v.len()
        }
        fn heap(strings: &[Option<String>]) -> usize {
            strings.iter().flatten().map(String::len).sum()
        }
        match self {
            Self::Utf8(v) => slots(v) + heap(v),
            Self::Int8(v) => slots(v),
            Self::Int16(v) => slots(v),
            Self::Int32(v) => slots(v),
            Self::Int64(v) => slots(v),
            Self::Float32(v) => slots(v),
            Self::Float64(v) => slots(v),
            Self::Bool(v) => slots(v),
            Self::DateTime(v) => slots(v),
            Self::Categorical(c) => {
                slots(&c.codes)
                    + slots(&c.categories)
                    + c.categories.iter().map(String::len).sum::<usize>()
            }
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Typed cells.
    pub data: ColumnData,
}

impl Column {
    /// Create a column from its name and storage.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Logical type of the column.
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cell at `idx`, widened to a [`Value`]; out of range reads as null.
    pub fn get(&self, idx: usize) -> Value {
        self.data.get(idx)
    }
}

/// In-memory table: ordered, uniquely named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, validating column lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> InferenceResult<Self> {
        let mut table = Self::default();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Number of rows (0 for a table without columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Position of the column called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// The column called `name`.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Current (name, dtype) layout.
    pub fn schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| Field::new(c.name.clone(), c.data_type()))
                .collect(),
        )
    }

    /// Append a column at the end.
    pub fn push_column(&mut self, column: Column) -> InferenceResult<()> {
        self.check_insertable(&column, None)?;
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column by name, returning it.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.index_of(name)?;
        Some(self.columns.remove(idx))
    }

    /// Reads row `idx` across all columns.
    pub fn row(&self, idx: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.get(idx)).collect()
    }

    /// Estimated deep size in bytes of all column storage.
    pub fn memory_usage(&self) -> usize {
        self.columns.iter().map(|c| c.data.memory_usage()).sum()
    }

    /// Swap the storage of column `idx` for `data` of the same length.
    pub(crate) fn set_column_data(&mut self, idx: usize, data: ColumnData) {
        debug_assert_eq!(self.columns[idx].len(), data.len());
        self.columns[idx].data = data;
    }

    /// Replace column `idx` with `replacements`, keeping its position.
    ///
    /// Nothing is modified when a replacement is invalid.
    pub(crate) fn splice_column(
        &mut self,
        idx: usize,
        replacements: Vec<Column>,
    ) -> InferenceResult<()> {
        for (i, column) in replacements.iter().enumerate() {
            self.check_insertable(column, Some(idx))?;
            if replacements[..i].iter().any(|c| c.name == column.name) {
                return Err(InferenceError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if let Some(first) = replacements.first().filter(|f| f.len() != column.len()) {
                return Err(InferenceError::RaggedTable {
                    column: column.name.clone(),
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.columns.splice(idx..=idx, replacements);
        Ok(())
    }

    fn check_insertable(&self, column: &Column, replacing: Option<usize>) -> InferenceResult<()> {
        let others = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replacing)
            .map(|(_, c)| c);
        let mut expected = None;
        for other in others {
            if other.name == column.name {
                return Err(InferenceError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            expected.get_or_insert(other.len());
        }
        match expected {
            Some(expected) if expected != column.len() => Err(InferenceError::RaggedTable {
                column: column.name.clone(),
                expected,
                actual: column.len(),
            }),
            _ => Ok(()),
        }
    }
}
