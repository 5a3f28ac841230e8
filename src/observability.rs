//! Pipeline diagnostics.
//!
//! Stages never log through a process-wide sink directly: they emit [`PipelineEvent`]s to a
//! [`Diagnostics`] handle, which forwards them to a caller-provided [`PipelineObserver`]. The
//! default observer, [`TracingObserver`], turns events into `tracing` records.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::inference::InferenceRule;
use crate::types::{DataType, Schema};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Progress information.
    Info,
    /// Something was skipped or left as-is.
    Warning,
    /// The operation failed.
    Error,
    /// Infrastructure failure (typically I/O).
    Critical,
}

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Inference,
    MixedSplit,
    StorageOptimization,
}

impl Stage {
    /// Progress message for the stage.
    pub fn label(self) -> &'static str {
        match self {
            Self::Inference => "inferring and converting data types",
            Self::MixedSplit => "handling mixed numeric columns",
            Self::StorageOptimization => "optimizing data types",
        }
    }
}

/// When a table snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPoint {
    Initial,
    Final,
}

/// Something that happened while processing a table.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    ProcessingStarted {
        path: PathBuf,
    },
    ReadFailed {
        path: PathBuf,
        severity: Severity,
        message: String,
    },
    /// Column dtypes and estimated memory footprint.
    Snapshot {
        point: SnapshotPoint,
        schema: Schema,
        memory_bytes: usize,
    },
    StageStarted {
        stage: Stage,
    },
    ColumnEmpty {
        column: String,
    },
    ColumnConverted {
        column: String,
        rule: InferenceRule,
        to: DataType,
    },
    ColumnRemainsText {
        column: String,
    },
    ColumnSplit {
        column: String,
        numeric: String,
        non_numeric: String,
    },
    ColumnSplitSkipped {
        column: String,
        reason: String,
    },
    ColumnDowncast {
        column: String,
        from: DataType,
        to: DataType,
    },
}

impl PipelineEvent {
    /// Severity used for log level and alerting.
    pub fn severity(&self) -> Severity {
        match self {
            Self::ReadFailed { severity, .. } => *severity,
            Self::ColumnEmpty { .. } | Self::ColumnSplitSkipped { .. } => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProcessingStarted { path } => write!(f, "processing file: {}", path.display()),
            Self::ReadFailed { path, message, .. } => {
                write!(f, "error reading file {}: {message}", path.display())
            }
            Self::Snapshot {
                point,
                schema,
                memory_bytes,
            } => {
                let label = match point {
                    SnapshotPoint::Initial => "initial",
                    SnapshotPoint::Final => "final",
                };
                write!(
                    f,
                    "{label} data types: [{schema}]; {label} memory usage: {:.2} MB",
                    *memory_bytes as f64 / 1e6
                )
            }
            Self::StageStarted { stage } => write!(f, "{}...", stage.label()),
            Self::ColumnEmpty { column } => write!(f, "column '{column}' is empty, skipping"),
            Self::ColumnConverted { column, rule, to } => {
                write!(f, "column '{column}' converted to {to} ({})", rule.label())
            }
            Self::ColumnRemainsText { column } => {
                write!(f, "column '{column}' remains as object type")
            }
            Self::ColumnSplit {
                column,
                numeric,
                non_numeric,
            } => write!(
                f,
                "split column '{column}' into '{numeric}' and '{non_numeric}'"
            ),
            Self::ColumnSplitSkipped { column, reason } => {
                write!(f, "column '{column}' not split: {reason}")
            }
            Self::ColumnDowncast { column, from, to } => {
                write!(f, "column '{column}' downcast {from} -> {to}")
            }
        }
    }
}

/// Observer interface for pipeline events.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called for every event.
    fn on_event(&self, event: &PipelineEvent);

    /// Called when an event meets the alert threshold, after [`Self::on_event`].
    fn on_alert(&self, _event: &PipelineEvent) {}
}

/// Forwards events to `tracing` at a level matching their [`Severity`].
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event.severity() {
            Severity::Info => info!(target: "tabular_infer", "{event}"),
            Severity::Warning => warn!(target: "tabular_infer", "{event}"),
            Severity::Error | Severity::Critical => error!(target: "tabular_infer", "{event}"),
        }
    }

    fn on_alert(&self, event: &PipelineEvent) {
        error!(target: "tabular_infer", severity = ?event.severity(), "[ALERT] {event}");
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &PipelineEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }

    fn on_alert(&self, event: &PipelineEvent) {
        for o in &self.observers {
            o.on_alert(event);
        }
    }
}

/// Appends pipeline events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_event(&self, event: &PipelineEvent) {
        self.append_line(&format!("{} {:?} {event}", unix_ts(), event.severity()));
    }

    fn on_alert(&self, event: &PipelineEvent) {
        self.append_line(&format!("{} ALERT {:?} {event}", unix_ts(), event.severity()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Event sink handed to every pipeline stage.
#[derive(Clone)]
pub struct Diagnostics {
    observer: Arc<dyn PipelineObserver>,
    alert_at_or_above: Severity,
}

impl Diagnostics {
    /// Send events to `observer`; events at or above `alert_at_or_above` also raise `on_alert`.
    pub fn new(observer: Arc<dyn PipelineObserver>, alert_at_or_above: Severity) -> Self {
        Self {
            observer,
            alert_at_or_above,
        }
    }

    /// Deliver `event` to the observer, raising an alert at or above the threshold.
    pub fn emit(&self, event: PipelineEvent) {
        self.observer.on_event(&event);
        if event.severity() >= self.alert_at_or_above {
            self.observer.on_alert(&event);
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Arc::new(TracingObserver), Severity::Critical)
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish_non_exhaustive()
    }
}
