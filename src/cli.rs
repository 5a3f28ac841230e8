//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "tabular-infer",
    version,
    about = "Infer column types of CSV and Excel files",
    long_about = "Load a CSV or Excel file, infer semantic column types (numeric, boolean,\n\
                  datetime, categorical, text), split mixed numeric columns and downcast\n\
                  numeric storage. Writes processed_<name>.csv."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (overrides RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Append pipeline events to this file in addition to logging them.
    #[arg(long = "event-log", value_name = "PATH", global = true)]
    pub event_log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process one file and write the result as CSV.
    Process(ProcessArgs),

    /// Print per-column statistics of one file as JSON.
    Stats(StatsArgs),
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// Input file (.csv, .xls, .xlsx, .xlsm, .xlsb, .ods).
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output directory (default: the input's directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also print per-column statistics of the processed table as JSON.
    #[arg(long = "stats")]
    pub stats: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser)]
pub struct StatsArgs {
    /// Input file (.csv, .xls, .xlsx, .xlsm, .xlsb, .ods).
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Report statistics of the file as loaded, before processing.
    #[arg(long = "raw")]
    pub raw: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser)]
pub struct CommonArgs {
    /// Always parse this column as datetime (repeatable).
    #[arg(long = "date-column", value_name = "NAME")]
    pub date_columns: Vec<String>,

    /// Minimum numeric fraction of the sample for a numeric conversion.
    #[arg(long = "numeric-threshold", default_value_t = 0.8)]
    pub numeric_threshold: f64,

    /// Unique/row ratio below which a text column becomes categorical.
    #[arg(long = "categorical-threshold", default_value_t = 0.5)]
    pub categorical_threshold: f64,

    /// Seed for reproducible sampling.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Sheet to read from a workbook (default: the first sheet).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}
