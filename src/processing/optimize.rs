//! Storage downcasting for numeric columns.

use crate::observability::{Diagnostics, PipelineEvent, Stage};
use crate::types::{ColumnData, Table};

/// Narrow every integer and `Float64` column to the smallest lossless representation.
///
/// Integers narrow to the smallest of `Int8`/`Int16`/`Int32`/`Int64` holding the observed range.
/// `Float64` narrows to `Float32` only when every value survives the round trip exactly.
/// Values and nulls never change.
pub fn optimize_storage(mut table: Table, diagnostics: &Diagnostics) -> Table {
    diagnostics.emit(PipelineEvent::StageStarted {
        stage: Stage::StorageOptimization,
    });

    for idx in 0..table.column_count() {
        let column = &table.columns()[idx];
        let Some(narrowed) = downcast(&column.data) else {
            continue;
        };
        let event = PipelineEvent::ColumnDowncast {
            column: column.name.clone(),
            from: column.data_type(),
            to: narrowed.data_type(),
        };
        table.set_column_data(idx, narrowed);
        diagnostics.emit(event);
    }

    table
}

/// The narrowed storage, or `None` when `data` is not numeric or already minimal.
pub fn downcast(data: &ColumnData) -> Option<ColumnData> {
    match data {
        ColumnData::Int64(v) => downcast_integers(v.iter().map(|x| x.map(i64::from)), 64),
        ColumnData::Int32(v) => downcast_integers(v.iter().map(|x| x.map(i64::from)), 32),
        ColumnData::Int16(v) => downcast_integers(v.iter().map(|x| x.map(i64::from)), 16),
        ColumnData::Float64(v) => downcast_floats(v),
        _ => None,
    }
}

fn downcast_integers<I>(values: I, current_bits: u32) -> Option<ColumnData>
where
    I: Iterator<Item = Option<i64>> + Clone,
{
    let (min, max) = values
        .clone()
        .flatten()
        .fold((0i64, 0i64), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let fits = |lo: i64, hi: i64| min >= lo && max <= hi;
    let target_bits = if fits(i8::MIN.into(), i8::MAX.into()) {
        8
    } else if fits(i16::MIN.into(), i16::MAX.into()) {
        16
    } else if fits(i32::MIN.into(), i32::MAX.into()) {
        32
    } else {
        64
    };
    if target_bits >= current_bits {
        return None;
    }

    // The range check above guarantees every conversion succeeds.
    let narrowed = match target_bits {
        8 => ColumnData::Int8(values.map(|x| x.and_then(|v| i8::try_from(v).ok())).collect()),
        16 => ColumnData::Int16(values.map(|x| x.and_then(|v| i16::try_from(v).ok())).collect()),
        _ => ColumnData::Int32(values.map(|x| x.and_then(|v| i32::try_from(v).ok())).collect()),
    };
    Some(narrowed)
}

fn downcast_floats(values: &[Option<f64>]) -> Option<ColumnData> {
    let lossless = values.iter().flatten().all(|&v| {
        let narrowed = v as f32;
        f64::from(narrowed) == v || (v.is_nan() && narrowed.is_nan())
    });
    if !lossless {
        return None;
    }
    Some(ColumnData::Float32(
        values.iter().map(|x| x.map(|v| v as f32)).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType, Value};

    fn assert_same_values(before: &ColumnData, after: &ColumnData) {
        assert_eq!(before.len(), after.len());
        for i in 0..before.len() {
            assert_eq!(before.get(i), after.get(i), "row {i}");
        }
    }

    #[test]
    fn integers_narrow_to_smallest_width() {
        let cases = [
            (vec![Some(1), Some(-128), Some(127)], DataType::Int8),
            (vec![Some(128), None], DataType::Int16),
            (vec![Some(-40_000), Some(7)], DataType::Int32),
        ];
        for (values, expected) in cases {
            let data = ColumnData::Int64(values);
            let narrowed = downcast(&data).unwrap();
            assert_eq!(narrowed.data_type(), expected);
            assert_same_values(&data, &narrowed);
        }
    }

    #[test]
    fn wide_range_and_minimal_columns_stay() {
        assert_eq!(downcast(&ColumnData::Int64(vec![Some(i64::MAX), Some(0)])), None);
        assert_eq!(downcast(&ColumnData::Int8(vec![Some(1)])), None);
        assert_eq!(downcast(&ColumnData::from_strs(&[Some("1")])), None);
        assert_eq!(downcast(&ColumnData::Bool(vec![Some(true)])), None);
    }

    #[test]
    fn floats_narrow_only_when_exact() {
        let exact = ColumnData::Float64(vec![Some(0.5), Some(-2.25), None, Some(1e10)]);
        let narrowed = downcast(&exact).unwrap();
        assert_eq!(narrowed.data_type(), DataType::Float32);
        assert_same_values(&exact, &narrowed);

        let inexact = ColumnData::Float64(vec![Some(0.1), Some(1.0)]);
        assert_eq!(downcast(&inexact), None);
    }

    #[test]
    fn all_null_column_narrows_without_new_values() {
        let data = ColumnData::Int64(vec![None, None]);
        let narrowed = downcast(&data).unwrap();
        assert_eq!(narrowed, ColumnData::Int8(vec![None, None]));
    }

    #[test]
    fn table_pass_preserves_values_and_rows() {
        let table = Table::new(vec![
            Column::new("small", ColumnData::Int64(vec![Some(3), Some(4)])),
            Column::new("price", ColumnData::Float64(vec![Some(9.99), Some(1.0)])),
            Column::new("flag", ColumnData::Bool(vec![Some(true), None])),
        ])
        .unwrap();
        let out = optimize_storage(table.clone(), &Diagnostics::default());
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.column("small").unwrap().data_type(), DataType::Int8);
        assert_eq!(out.column("price").unwrap().data_type(), DataType::Float64);
        for (before, after) in table.columns().iter().zip(out.columns()) {
            assert_same_values(&before.data, &after.data);
        }
        assert_eq!(out.column("small").unwrap().get(1), Value::Int64(4));
    }
}
