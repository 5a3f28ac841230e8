//! Column type inference.
//!
//! [`infer_column_type`] classifies a single text column with an ordered list of rules; the
//! first rule that matches decides the new type:
//!
//! 1. no non-null values: left unchanged ([`InferenceOutcome::Empty`])
//! 2. name listed in [`InferenceOptions::forced_datetime_columns`]: parsed as datetimes
//! 3. a random sample of at most [`MAX_SAMPLE_SIZE`] non-null values is drawn
//! 4. numeric ratio of the sample ≥ `numeric_threshold`: numeric
//! 5. distinct sample values ⊆ [`convert::BOOLEAN_TOKENS`]: boolean
//! 6. date ratio of the sample ≥ [`DATE_THRESHOLD`]: datetime
//! 7. `unique / rows` over the whole column < `categorical_threshold`: categorical
//! 8. otherwise the column stays text ([`InferenceOutcome::RemainsText`])
//!
//! ```rust
//! use tabular_infer::inference::{infer_column_type, HeadSampler, InferenceOptions};
//! use tabular_infer::types::{Column, ColumnData, DataType};
//!
//! let column = Column::new(
//!     "answer",
//!     ColumnData::from_strs(&[Some("Y"), Some("N"), Some("Y"), Some("Y"), Some("N")]),
//! );
//! let outcome = infer_column_type(&column, &InferenceOptions::default(), &mut HeadSampler);
//! assert_eq!(outcome.data_type(), Some(DataType::Bool));
//! ```

pub mod convert;
pub mod sampling;

use std::collections::{BTreeSet, HashSet};

use crate::observability::{Diagnostics, PipelineEvent, Stage};
use crate::predicates::{is_date_str, parse_numeric};
use crate::types::{Column, ColumnData, DataType, Table};

pub use sampling::{HeadSampler, RandomSampler, Sampler};

/// Upper bound on the number of values examined per column.
pub const MAX_SAMPLE_SIZE: usize = 1000;

/// Minimum fraction of sampled values that must look like dates.
pub const DATE_THRESHOLD: f64 = 0.8;

/// Thresholds and overrides for [`infer_column_type`].
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOptions {
    /// Minimum numeric fraction of the sample for a numeric conversion.
    pub numeric_threshold: f64,
    /// A column whose unique/row ratio is strictly below this becomes categorical.
    pub categorical_threshold: f64,
    /// Columns always parsed as datetimes, bypassing detection.
    pub forced_datetime_columns: BTreeSet<String>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            numeric_threshold: 0.8,
            categorical_threshold: 0.5,
            forced_datetime_columns: BTreeSet::new(),
        }
    }
}

impl InferenceOptions {
    /// Force `columns` to be parsed as datetimes.
    pub fn with_forced_datetime_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forced_datetime_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }
}

/// The rule that converted a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceRule {
    ForcedDateTime,
    Numeric,
    Boolean,
    DateTime,
    Categorical,
}

impl InferenceRule {
    /// Human-readable rule name used in event messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::ForcedDateTime => "forced datetime",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Categorical => "categorical",
        }
    }
}

/// Result of classifying one column.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutcome {
    /// The column is not text; inference does not apply.
    NotText,
    /// The column has no non-null values.
    Empty,
    /// A rule matched; `data` replaces the column's storage.
    Converted { rule: InferenceRule, data: ColumnData },
    /// No rule matched.
    RemainsText,
}

impl InferenceOutcome {
    /// New dtype, if the column was converted.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Converted { data, .. } => Some(data.data_type()),
            _ => None,
        }
    }
}

/// Classify one column. The column itself is not modified.
pub fn infer_column_type(
    column: &Column,
    options: &InferenceOptions,
    sampler: &mut dyn Sampler,
) -> InferenceOutcome {
    let ColumnData::Utf8(values) = &column.data else {
        return InferenceOutcome::NotText;
    };

    let non_null: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    if non_null.is_empty() {
        return InferenceOutcome::Empty;
    }

    if options.forced_datetime_columns.contains(&column.name) {
        return converted(InferenceRule::ForcedDateTime, convert::to_datetime(values));
    }

    let sample: Vec<&str> = sampler
        .sample_indices(non_null.len(), MAX_SAMPLE_SIZE.min(non_null.len()))
        .into_iter()
        .filter_map(|i| non_null.get(i).copied())
        .collect();
    if sample.is_empty() {
        return InferenceOutcome::RemainsText;
    }

    if ratio(&sample, |v| parse_numeric(v).is_some()) >= options.numeric_threshold {
        return converted(InferenceRule::Numeric, convert::to_numeric(values));
    }

    if sample.iter().all(|v| convert::boolean_token(v).is_some()) {
        return converted(InferenceRule::Boolean, convert::to_boolean(values));
    }

    if ratio(&sample, is_date_str) >= DATE_THRESHOLD {
        return converted(InferenceRule::DateTime, convert::to_datetime(values));
    }

    if unique_ratio(values) < options.categorical_threshold {
        return converted(InferenceRule::Categorical, convert::to_categorical(values));
    }

    InferenceOutcome::RemainsText
}

/// Run [`infer_column_type`] over every text column of `table`.
pub fn infer_and_convert_types(
    mut table: Table,
    options: &InferenceOptions,
    sampler: &mut dyn Sampler,
    diagnostics: &Diagnostics,
) -> Table {
    diagnostics.emit(PipelineEvent::StageStarted {
        stage: Stage::Inference,
    });

    for idx in 0..table.column_count() {
        let column = &table.columns()[idx];
        let name = column.name.clone();
        match infer_column_type(column, options, sampler) {
            InferenceOutcome::NotText => {}
            InferenceOutcome::Empty => diagnostics.emit(PipelineEvent::ColumnEmpty { column: name }),
            InferenceOutcome::RemainsText => {
                diagnostics.emit(PipelineEvent::ColumnRemainsText { column: name })
            }
            InferenceOutcome::Converted { rule, data } => {
                let to = data.data_type();
                table.set_column_data(idx, data);
                diagnostics.emit(PipelineEvent::ColumnConverted {
                    column: name,
                    rule,
                    to,
                });
            }
        }
    }

    table
}

fn converted(rule: InferenceRule, data: ColumnData) -> InferenceOutcome {
    InferenceOutcome::Converted { rule, data }
}

fn ratio(sample: &[&str], predicate: impl Fn(&str) -> bool) -> f64 {
    let hits = sample.iter().filter(|v| predicate(v)).count();
    hits as f64 / sample.len() as f64
}

/// Distinct values (null counted once, if present) over row count.
fn unique_ratio(values: &[Option<String>]) -> f64 {
    let distinct: HashSet<Option<&str>> = values.iter().map(Option::as_deref).collect();
    distinct.len() as f64 / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::new(name, ColumnData::from_strs(values))
    }

    fn infer(column: &Column, options: &InferenceOptions) -> InferenceOutcome {
        infer_column_type(column, options, &mut RandomSampler::seeded(11))
    }

    #[test]
    fn numeric_strings_convert_without_new_nulls() {
        let column = text("n", &[Some("1"), Some("2"), Some("3"), Some("4"), Some("5")]);
        let outcome = infer(&column, &InferenceOptions::default());
        assert_eq!(
            outcome,
            InferenceOutcome::Converted {
                rule: InferenceRule::Numeric,
                data: ColumnData::Int64(vec![Some(1), Some(2), Some(3), Some(4), Some(5)]),
            }
        );
    }

    #[test]
    fn yes_no_becomes_boolean() {
        let column = text("b", &[Some("Yes"), Some("No"), None, Some("Yes")]);
        let outcome = infer(&column, &InferenceOptions::default());
        assert_eq!(
            outcome,
            InferenceOutcome::Converted {
                rule: InferenceRule::Boolean,
                data: ColumnData::Bool(vec![Some(true), Some(false), None, Some(true)]),
            }
        );
    }

    #[test]
    fn y_n_becomes_boolean() {
        let column = text("b", &[Some("Y"), Some("N"), Some("Y"), Some("Y"), Some("N")]);
        match infer(&column, &InferenceOptions::default()) {
            InferenceOutcome::Converted { data, .. } => assert_eq!(
                data,
                ColumnData::Bool(vec![Some(true), Some(false), Some(true), Some(true), Some(false)])
            ),
            other => panic!("expected boolean conversion, got {other:?}"),
        }
    }

    #[test]
    fn single_outlier_blocks_boolean_detection() {
        let mut values = vec![Some("Yes"); 999];
        values.push(Some("maybe"));
        let column = text("b", &values);
        let outcome = infer_column_type(&column, &InferenceOptions::default(), &mut HeadSampler);
        // Two distinct values over 1000 rows: categorical, not boolean.
        assert_eq!(outcome.data_type(), Some(DataType::Categorical));
    }

    #[test]
    fn dates_are_detected_after_numeric_and_boolean() {
        let column = text(
            "when",
            &[
                Some("2021-01-01"),
                Some("March 3 2020"),
                Some("2021-02-14 10:00:00"),
                Some("Meeting on June 5 2019 at noon"),
                Some("01/02/2020"),
            ],
        );
        let outcome = infer(&column, &InferenceOptions::default());
        assert_eq!(outcome.data_type(), Some(DataType::DateTime));
        if let InferenceOutcome::Converted { rule, data } = outcome {
            assert_eq!(rule, InferenceRule::DateTime);
            assert_eq!(data.null_count(), 0);
        }
    }

    #[test]
    fn thousands_separated_figures_are_not_dates() {
        let raw = [
            Some("1,000"),
            Some("2,500"),
            Some("12,345"),
            Some("45,000"),
            Some("7,250"),
            Some("9,999"),
        ];
        let column = text("amount", &raw);
        let outcome = infer_column_type(&column, &InferenceOptions::default(), &mut HeadSampler);
        assert_eq!(outcome, InferenceOutcome::RemainsText);

        let repeated = text(
            "amount",
            &[Some("1,000"), Some("1,000"), Some("2,500"), Some("1,000"), Some("1,000")],
        );
        let outcome = infer_column_type(&repeated, &InferenceOptions::default(), &mut HeadSampler);
        assert_eq!(outcome.data_type(), Some(DataType::Categorical));
    }

    #[test]
    fn low_cardinality_text_becomes_categorical_without_altering_values() {
        let raw = [Some("red"), Some("blue"), Some("red"), Some("red"), Some("blue"), Some("red")];
        let column = text("colour", &raw);
        match infer(&column, &InferenceOptions::default()) {
            InferenceOutcome::Converted {
                rule: InferenceRule::Categorical,
                data: ColumnData::Categorical(cat),
            } => {
                let expected: Vec<Option<String>> =
                    raw.iter().map(|v| v.map(str::to_owned)).collect();
                assert_eq!(cat.to_values(), expected);
            }
            other => panic!("expected categorical, got {other:?}"),
        }
    }

    #[test]
    fn mixed_column_below_threshold_remains_text() {
        let column = text("mixed", &[Some("123"), Some("abc"), Some("456"), Some("xyz"), Some("789")]);
        assert_eq!(
            infer(&column, &InferenceOptions::default()),
            InferenceOutcome::RemainsText
        );
    }

    #[test]
    fn numeric_threshold_is_configurable() {
        let column = text("mixed", &[Some("123"), Some("abc"), Some("456"), Some("xyz"), Some("789")]);
        let options = InferenceOptions {
            numeric_threshold: 0.6,
            ..Default::default()
        };
        assert_eq!(
            infer(&column, &options),
            InferenceOutcome::Converted {
                rule: InferenceRule::Numeric,
                data: ColumnData::Int64(vec![Some(123), None, Some(456), None, Some(789)]),
            }
        );
    }

    #[test]
    fn empty_and_non_text_columns_are_skipped() {
        let empty = text("e", &[None, None]);
        assert_eq!(infer(&empty, &InferenceOptions::default()), InferenceOutcome::Empty);

        let typed = Column::new("i", ColumnData::Int64(vec![Some(1)]));
        assert_eq!(infer(&typed, &InferenceOptions::default()), InferenceOutcome::NotText);
    }

    #[test]
    fn forced_datetime_wins_over_numeric() {
        let column = text("d", &[Some("2020-01-01"), Some("12345"), Some("nonsense")]);
        let options = InferenceOptions::default().with_forced_datetime_columns(["d"]);
        match infer(&column, &options) {
            InferenceOutcome::Converted {
                rule: InferenceRule::ForcedDateTime,
                data: ColumnData::DateTime(v),
            } => {
                assert!(v[0].is_some());
                assert!(v[2].is_none());
            }
            other => panic!("expected forced datetime, got {other:?}"),
        }
    }

    #[test]
    fn sample_is_capped_at_max_size() {
        struct Counting(usize);
        impl Sampler for Counting {
            fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
                self.0 = amount;
                (0..amount.min(len)).collect()
            }
        }
        let values: Vec<Option<String>> = (0..5_000).map(|i| Some(format!("w{i}"))).collect();
        let column = Column::new("words", ColumnData::Utf8(values));
        let mut sampler = Counting(0);
        let _ = infer_column_type(&column, &InferenceOptions::default(), &mut sampler);
        assert_eq!(sampler.0, MAX_SAMPLE_SIZE);
    }

    #[test]
    fn table_pass_converts_only_text_columns() {
        let table = Table::new(vec![
            text("n", &[Some("1"), Some("2")]),
            Column::new("f", ColumnData::Float64(vec![Some(1.5), None])),
            text("e", &[None, None]),
        ])
        .unwrap();
        let out = infer_and_convert_types(
            table,
            &InferenceOptions::default(),
            &mut HeadSampler,
            &Diagnostics::default(),
        );
        let dtypes: Vec<DataType> = out.columns().iter().map(Column::data_type).collect();
        assert_eq!(dtypes, vec![DataType::Int64, DataType::Float64, DataType::Utf8]);
        assert_eq!(out.row_count(), 2);
    }
}
