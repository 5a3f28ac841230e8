//! Per-column descriptive statistics.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::inference::Sampler;
use crate::types::{Column, ColumnData, Table, Value};

/// Number of example values reported for text columns.
pub const SAMPLE_VALUES: usize = 5;

/// Read-only summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    /// dtype label (see [`crate::types::DataType::label`]).
    pub dtype: String,
    /// Distinct non-null values.
    pub unique_count: usize,
    pub null_count: usize,
    #[serde(flatten)]
    pub details: StatsDetails,
}

/// Type-specific statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatsDetails {
    /// Integer and float columns. All fields are `None` for an all-null column.
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        mean: Option<f64>,
        median: Option<f64>,
    },
    /// Text and categorical columns.
    Text {
        min_length: Option<usize>,
        max_length: Option<usize>,
        sample_values: Vec<String>,
    },
    /// Booleans and datetimes.
    Basic {},
}

/// Compute [`ColumnStats`] for every column. The table is not modified.
pub fn get_column_stats(table: &Table, sampler: &mut dyn Sampler) -> BTreeMap<String, ColumnStats> {
    table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), column_stats(c, sampler)))
        .collect()
}

/// Statistics for a single column.
pub fn column_stats(column: &Column, sampler: &mut dyn Sampler) -> ColumnStats {
    let distinct: BTreeSet<String> = column
        .data
        .values()
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
        .collect();

    let details = if column.data_type().is_numeric() {
        numeric_details(&column.data)
    } else if let Some(strings) = text_values(&column.data) {
        text_details(&strings, sampler)
    } else {
        StatsDetails::Basic {}
    };

    ColumnStats {
        dtype: column.data_type().label().to_string(),
        unique_count: distinct.len(),
        null_count: column.data.null_count(),
        details,
    }
}

fn numeric_details(data: &ColumnData) -> StatsDetails {
    let mut values: Vec<f64> = data
        .values()
        .filter_map(|v| match v {
            Value::Int64(i) => Some(i as f64),
            Value::Float64(f) if !f.is_nan() => Some(f),
            _ => None,
        })
        .collect();
    if values.is_empty() {
        return StatsDetails::Numeric {
            min: None,
            max: None,
            mean: None,
            median: None,
        };
    }

    values.sort_by(f64::total_cmp);
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    StatsDetails::Numeric {
        min: values.first().copied(),
        max: values.last().copied(),
        mean: Some(mean),
        median: Some(median),
    }
}

fn text_values(data: &ColumnData) -> Option<Vec<String>> {
    match data {
        ColumnData::Utf8(v) => Some(v.iter().flatten().cloned().collect()),
        ColumnData::Categorical(c) => Some(c.to_values().into_iter().flatten().collect()),
        _ => None,
    }
}

fn text_details(strings: &[String], sampler: &mut dyn Sampler) -> StatsDetails {
    let lengths = strings.iter().map(|s| s.chars().count());
    let sample_values = sampler
        .sample_indices(strings.len(), SAMPLE_VALUES)
        .into_iter()
        .filter_map(|i| strings.get(i).cloned())
        .collect();
    StatsDetails::Text {
        min_length: lengths.clone().min(),
        max_length: lengths.max(),
        sample_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{HeadSampler, RandomSampler};
    use crate::types::CategoricalData;

    fn table() -> Table {
        Table::new(vec![
            Column::new("n", ColumnData::Int16(vec![Some(4), Some(1), None, Some(3), Some(1)])),
            Column::new(
                "name",
                ColumnData::from_strs(&[Some("Ada"), Some("Grace"), None, Some("Al"), Some("Ada")]),
            ),
            Column::new("ok", ColumnData::Bool(vec![Some(true), None, None, Some(false), None])),
        ])
        .unwrap()
    }

    #[test]
    fn numeric_stats_ignore_nulls() {
        let stats = get_column_stats(&table(), &mut HeadSampler);
        let n = &stats["n"];
        assert_eq!(n.dtype, "int16");
        assert_eq!(n.unique_count, 3);
        assert_eq!(n.null_count, 1);
        assert_eq!(
            n.details,
            StatsDetails::Numeric {
                min: Some(1.0),
                max: Some(4.0),
                mean: Some(2.25),
                median: Some(2.0),
            }
        );
    }

    #[test]
    fn text_stats_report_lengths_and_sample() {
        let stats = get_column_stats(&table(), &mut RandomSampler::seeded(3));
        let name = &stats["name"];
        assert_eq!(name.dtype, "object");
        assert_eq!(name.unique_count, 3);
        assert_eq!(name.null_count, 1);
        match &name.details {
            StatsDetails::Text {
                min_length,
                max_length,
                sample_values,
            } => {
                assert_eq!(*min_length, Some(2));
                assert_eq!(*max_length, Some(5));
                assert_eq!(sample_values.len(), 4);
                assert!(sample_values.iter().all(|s| ["Ada", "Grace", "Al"].contains(&s.as_str())));
            }
            other => panic!("expected text stats, got {other:?}"),
        }
    }

    #[test]
    fn categorical_uses_text_stats_and_booleans_get_counts_only() {
        let values = vec![Some("x".to_string()), Some("yy".to_string()), Some("x".to_string())];
        let column = Column::new("c", ColumnData::Categorical(CategoricalData::from_values(&values)));
        let stats = column_stats(&column, &mut HeadSampler);
        assert_eq!(stats.dtype, "category");
        assert_eq!(stats.unique_count, 2);
        assert!(matches!(stats.details, StatsDetails::Text { max_length: Some(2), .. }));

        let all = get_column_stats(&table(), &mut HeadSampler);
        assert_eq!(all["ok"].details, StatsDetails::Basic {});
        assert_eq!(all["ok"].null_count, 3);
    }

    #[test]
    fn stats_do_not_mutate_and_serialize_flat() {
        let t = table();
        let before = t.clone();
        let stats = get_column_stats(&t, &mut HeadSampler);
        assert_eq!(t, before);

        let json = serde_json::to_value(&stats["n"]).unwrap();
        assert_eq!(json["dtype"], "int16");
        assert_eq!(json["median"], 2.0);
        assert_eq!(json["null_count"], 1);
    }
}
