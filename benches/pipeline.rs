use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tabular_infer::inference::{infer_and_convert_types, InferenceOptions, RandomSampler};
use tabular_infer::observability::{Diagnostics, PipelineEvent, PipelineObserver, Severity};
use tabular_infer::pipeline::process_table;
use tabular_infer::types::{Column, ColumnData, Table};

use std::sync::Arc;

struct Silent;

impl PipelineObserver for Silent {
    fn on_event(&self, _event: &PipelineEvent) {}
}

fn text_table(rows: usize) -> Table {
    let column = |name: &str, f: &dyn Fn(usize) -> String| {
        let values: Vec<Option<String>> = (0..rows).map(|i| Some(f(i))).collect();
        let refs: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
        Column::new(name, ColumnData::from_strs(&refs))
    };
    Table::new(vec![
        column("id", &|i| i.to_string()),
        column("flag", &|i| (if i % 2 == 0 { "Y" } else { "N" }).to_string()),
        column("day", &|i| format!("2021-{:02}-{:02}", i % 12 + 1, i % 28 + 1)),
        column("price", &|i| format!("{}.25", i % 1000)),
        column("mixed", &|i| if i % 3 == 0 { "n/a".to_string() } else { i.to_string() }),
        column("region", &|i| ["north", "south", "east"][i % 3].to_string()),
    ])
    .unwrap()
}

fn diagnostics() -> Diagnostics {
    Diagnostics::new(Arc::new(Silent), Severity::Critical)
}

fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference");
    for rows in [1_000usize, 10_000, 100_000] {
        let table = text_table(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| {
                let mut sampler = RandomSampler::seeded(1);
                infer_and_convert_types(
                    black_box(table.clone()),
                    &InferenceOptions::default(),
                    &mut sampler,
                    &diagnostics(),
                )
            });
        });
    }
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_table");
    for rows in [1_000usize, 10_000] {
        let table = text_table(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| {
                let mut sampler = RandomSampler::seeded(1);
                process_table(
                    black_box(table.clone()),
                    &InferenceOptions::default(),
                    &mut sampler,
                    &diagnostics(),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_inference, bench_full_pipeline);
criterion_main!(benches);
