//! `tabular-infer` command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabular_infer::inference::{InferenceOptions, RandomSampler};
use tabular_infer::ingestion::{read_table, IngestionOptions, SheetSelection};
use tabular_infer::observability::{CompositeObserver, FileObserver, PipelineObserver, TracingObserver};
use tabular_infer::pipeline::{ProcessOptions, ProcessRequest};
use tabular_infer::stats::get_column_stats;
use tabular_infer::types::Table;

mod cli;

use crate::cli::{Cli, Command, CommonArgs, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    let result = match &cli.command {
        Command::Process(args) => {
            let options = process_options(&args.common, cli.event_log.as_ref());
            run_process(args.input.clone(), args.output_dir.clone(), options, args.stats)
        }
        Command::Stats(args) => {
            let options = process_options(&args.common, cli.event_log.as_ref());
            run_stats(args.input.clone(), options, args.raw)
        }
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

/// `--log-level` wins over `RUST_LOG`; the default is `info`.
fn init_logging(level: Option<LogLevelArg>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn process_options(args: &CommonArgs, event_log: Option<&PathBuf>) -> ProcessOptions {
    let observer: Arc<dyn PipelineObserver> = match event_log {
        Some(path) => Arc::new(CompositeObserver::new(vec![
            Arc::new(TracingObserver) as Arc<dyn PipelineObserver>,
            Arc::new(FileObserver::new(path)) as Arc<dyn PipelineObserver>,
        ])),
        None => Arc::new(TracingObserver),
    };
    ProcessOptions {
        inference: InferenceOptions {
            numeric_threshold: args.numeric_threshold,
            categorical_threshold: args.categorical_threshold,
            ..InferenceOptions::default()
        }
        .with_forced_datetime_columns(args.date_columns.iter().cloned()),
        ingestion: IngestionOptions {
            format: None,
            sheet: args
                .sheet
                .clone()
                .map_or(SheetSelection::First, SheetSelection::Sheet),
        },
        observer: Some(observer),
        seed: args.seed,
        ..ProcessOptions::default()
    }
}

fn run_process(
    input: PathBuf,
    output_dir: Option<PathBuf>,
    options: ProcessOptions,
    stats: bool,
) -> Result<()> {
    let output_dir = output_dir.unwrap_or_else(|| {
        input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let seed = options.seed;
    let request = ProcessRequest {
        input,
        output_dir,
        options,
    };
    let (table, out) = request
        .run()
        .with_context(|| format!("processing {}", request.input.display()))?;
    println!("{}", out.display());
    if stats {
        print_stats(&table, seed)?;
    }
    Ok(())
}

fn run_stats(input: PathBuf, options: ProcessOptions, raw: bool) -> Result<()> {
    let table = if raw {
        read_table(&input, &options.ingestion)?
    } else {
        tabular_infer::pipeline::try_process_file(&input, &options)?
    };
    print_stats(&table, options.seed)
}

fn print_stats(table: &Table, seed: Option<u64>) -> Result<()> {
    let mut sampler = seed.map_or_else(RandomSampler::from_entropy, RandomSampler::seeded);
    let stats = get_column_stats(table, &mut sampler);
    let json = serde_json::to_string_pretty(&stats).context("serializing column statistics")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tabular-infer").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn process_flags_reach_the_pipeline_options() {
        let cli = parse(&[
            "process",
            "in.csv",
            "--date-column",
            "when",
            "--date-column",
            "day",
            "--numeric-threshold",
            "0.9",
            "--categorical-threshold",
            "0.3",
            "--seed",
            "4",
            "--sheet",
            "Data",
            "--log-level",
            "debug",
        ]);
        assert!(matches!(cli.log_level, Some(LogLevelArg::Debug)));
        let Command::Process(args) = &cli.command else {
            panic!("expected the process subcommand");
        };
        assert_eq!(args.input, PathBuf::from("in.csv"));
        assert_eq!(args.output_dir, None);
        assert!(!args.stats);

        let options = process_options(&args.common, cli.event_log.as_ref());
        assert_eq!(options.inference.numeric_threshold, 0.9);
        assert_eq!(options.inference.categorical_threshold, 0.3);
        let forced: Vec<&str> = options
            .inference
            .forced_datetime_columns
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(forced, vec!["day", "when"]);
        assert_eq!(options.seed, Some(4));
        assert_eq!(options.ingestion.sheet, SheetSelection::Sheet("Data".into()));
        assert_eq!(options.ingestion.format, None);
        assert!(options.observer.is_some());
    }

    #[test]
    fn stats_defaults_match_library_defaults() {
        let cli = parse(&["stats", "book.xlsx", "--raw", "--event-log", "events.log"]);
        assert_eq!(cli.event_log, Some(PathBuf::from("events.log")));
        let Command::Stats(args) = &cli.command else {
            panic!("expected the stats subcommand");
        };
        assert!(args.raw);

        let options = process_options(&args.common, cli.event_log.as_ref());
        let defaults = InferenceOptions::default();
        assert_eq!(options.inference.numeric_threshold, defaults.numeric_threshold);
        assert_eq!(options.inference.categorical_threshold, defaults.categorical_threshold);
        assert!(options.inference.forced_datetime_columns.is_empty());
        assert_eq!(options.ingestion.sheet, SheetSelection::First);
        assert_eq!(options.seed, None);
        assert!(options.observer.is_some());
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let bad = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("tabular-infer").chain(args.iter().copied())).is_err()
        };
        assert!(bad(&["process"]));
        assert!(bad(&["process", "in.csv", "--numeric-threshold", "high"]));
        assert!(bad(&["stats", "in.csv", "--log-level", "loud"]));
        assert!(bad(&["convert", "in.csv"]));
    }
}
