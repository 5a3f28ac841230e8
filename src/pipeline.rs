//! End-to-end processing: load a file, run the stages, report what happened.
//!
//! Stage order is fixed: type inference, then mixed-value splitting, then storage optimization.
//! A [`PipelineEvent::Snapshot`] with the column dtypes and estimated memory is emitted before
//! the first stage and after the last.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{InferenceError, InferenceResult, ReadErrorKind};
use crate::export::write_csv_to_path;
use crate::inference::{infer_and_convert_types, InferenceOptions, RandomSampler, Sampler};
use crate::ingestion::{read_table, IngestionOptions};
use crate::observability::{
    Diagnostics, PipelineEvent, PipelineObserver, Severity, SnapshotPoint, TracingObserver,
};
use crate::processing::{optimize_storage, split_mixed_numeric};
use crate::types::Table;

/// Prefix of the file written by [`ProcessRequest::run`].
pub const OUTPUT_PREFIX: &str = "processed_";

/// Options controlling [`process_file`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ProcessOptions {
    pub inference: InferenceOptions,
    pub ingestion: IngestionOptions,
    /// Receives every pipeline event. `None` logs through [`TracingObserver`].
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
    /// Fixed sampling seed for reproducible inference; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl fmt::Debug for ProcessOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessOptions")
            .field("inference", &self.inference)
            .field("ingestion", &self.ingestion)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("seed", &self.seed)
            .finish()
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            inference: InferenceOptions::default(),
            ingestion: IngestionOptions::default(),
            observer: None,
            alert_at_or_above: Severity::Critical,
            seed: None,
        }
    }
}

impl ProcessOptions {
    fn diagnostics(&self) -> Diagnostics {
        let observer = self
            .observer
            .clone()
            .unwrap_or_else(|| Arc::new(TracingObserver));
        Diagnostics::new(observer, self.alert_at_or_above)
    }

    fn sampler(&self) -> RandomSampler {
        self.seed
            .map_or_else(RandomSampler::from_entropy, RandomSampler::seeded)
    }
}

/// Load and process `path`, or `None` if it could not be read.
///
/// Read failures are reported to the observer as [`PipelineEvent::ReadFailed`].
pub fn process_file(path: impl AsRef<Path>, options: &ProcessOptions) -> Option<Table> {
    try_process_file(path, options).ok()
}

/// Like [`process_file`], but hands the error back to the caller.
pub fn try_process_file(path: impl AsRef<Path>, options: &ProcessOptions) -> InferenceResult<Table> {
    let path = path.as_ref();
    let diagnostics = options.diagnostics();
    diagnostics.emit(PipelineEvent::ProcessingStarted {
        path: path.to_path_buf(),
    });

    let table = match read_table(path, &options.ingestion) {
        Ok(table) => table,
        Err(e) => {
            diagnostics.emit(PipelineEvent::ReadFailed {
                path: path.to_path_buf(),
                severity: severity_for_error(&e),
                message: e.to_string(),
            });
            return Err(e);
        }
    };

    let mut sampler = options.sampler();
    Ok(process_table(
        table,
        &options.inference,
        &mut sampler,
        &diagnostics,
    ))
}

/// Run inference, splitting and optimization on an already loaded table.
pub fn process_table(
    table: Table,
    options: &InferenceOptions,
    sampler: &mut dyn Sampler,
    diagnostics: &Diagnostics,
) -> Table {
    emit_snapshot(&table, SnapshotPoint::Initial, diagnostics);

    let table = infer_and_convert_types(table, options, sampler, diagnostics);
    let table = split_mixed_numeric(table, diagnostics);
    let table = optimize_storage(table, diagnostics);

    emit_snapshot(&table, SnapshotPoint::Final, diagnostics);
    table
}

fn emit_snapshot(table: &Table, point: SnapshotPoint, diagnostics: &Diagnostics) {
    diagnostics.emit(PipelineEvent::Snapshot {
        point,
        schema: table.schema(),
        memory_bytes: table.memory_usage(),
    });
}

/// I/O failures are `Critical`; anything about the file's content is an `Error`.
pub fn severity_for_error(e: &InferenceError) -> Severity {
    match e {
        InferenceError::Io(_) => Severity::Critical,
        InferenceError::Read { source, .. } => match source {
            ReadErrorKind::Io(_) => Severity::Critical,
            ReadErrorKind::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Severity::Critical,
                _ => Severity::Error,
            },
            _ => Severity::Error,
        },
        InferenceError::Export(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        _ => Severity::Error,
    }
}

/// Owned request for the process-and-save workflow.
///
/// This can be useful if you want to enqueue processing work in a job system.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Path to the input file.
    pub input: PathBuf,
    /// Directory receiving `processed_<stem>.csv`; created if missing.
    pub output_dir: PathBuf,
    pub options: ProcessOptions,
}

impl ProcessRequest {
    /// Request with default [`ProcessOptions`].
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            options: ProcessOptions::default(),
        }
    }

    /// Path of the file [`Self::run`] writes.
    pub fn output_path(&self) -> PathBuf {
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir.join(format!("{OUTPUT_PREFIX}{stem}.csv"))
    }

    /// Process the input and write the result, returning the processed table and output path.
    pub fn run(&self) -> InferenceResult<(Table, PathBuf)> {
        let table = try_process_file(&self.input, &self.options)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let out = self.output_path();
        write_csv_to_path(&table, &out)?;
        Ok((table, out))
    }
}
