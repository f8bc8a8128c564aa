//! Observer hooks for run progress and per-file outcomes.
//!
//! The pipeline reports to a single [`PipelineObserver`]. The default [`TracingObserver`]
//! turns callbacks into `tracing` events; tests and embedders can plug in their own (or fan
//! out with [`CompositeObserver`]).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::discovery::FileKind;
use crate::error::IngestionError;
use crate::pipeline::RunStage;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (file skipped).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl IngestionSeverity {
    /// Severity of a per-file failure.
    pub fn for_error(e: &IngestionError) -> Self {
        match e {
            IngestionError::Io(_) => Self::Critical,
            IngestionError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            #[cfg(feature = "excel")]
            IngestionError::Excel(calamine::Error::Io(_)) => Self::Critical,
            #[cfg(feature = "excel")]
            IngestionError::Excel(_) => Self::Error,
            IngestionError::Json(err) if err.is_io() => Self::Critical,
            IngestionError::Json(_) => Self::Error,
            IngestionError::Unsupported { .. } => Self::Warning,
            IngestionError::SchemaMismatch { .. } | IngestionError::RaggedTable { .. } => {
                Self::Error
            }
        }
    }
}

/// Context about a single file load attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Path of the staged file.
    pub path: PathBuf,
    /// Detected kind, `None` when the extension is unsupported.
    pub kind: Option<FileKind>,
}

/// Stats reported when a file loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Tables produced (more than one for multi-sheet workbooks).
    pub tables: usize,
    /// Rows across those tables.
    pub rows: usize,
}

/// Observer interface for run progress.
///
/// Every method has a no-op default so implementors only override what they need.
pub trait PipelineObserver: Send + Sync {
    /// Called when the orchestrator enters a stage.
    fn on_stage(&self, _stage: RunStage) {}

    /// Called when a file loads.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a file fails to load.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when a load failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
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
    fn on_stage(&self, stage: RunStage) {
        for o in &self.observers {
            o.on_stage(stage);
        }
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits every callback as a `tracing` event.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage(&self, stage: RunStage) {
        info!(?stage, "entering stage");
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        info!(
            kind = ?ctx.kind,
            path = %ctx.path.display(),
            tables = stats.tables,
            rows = stats.rows,
            "successfully loaded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        if severity <= IngestionSeverity::Warning {
            warn!(?severity, kind = ?ctx.kind, path = %ctx.path.display(), %error, "skipped file");
        } else {
            error!(?severity, kind = ?ctx.kind, path = %ctx.path.display(), %error, "error loading file");
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        error!(
            alert = true,
            ?severity,
            kind = ?ctx.kind,
            path = %ctx.path.display(),
            %error,
            "error loading file"
        );
    }
}
