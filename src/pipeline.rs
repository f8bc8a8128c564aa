//! Run orchestration.
//!
//! A [`Pipeline`] walks the stages in [`RunStage`] order. Per-file problems are absorbed
//! inside the stages; anything that reaches this level ends the run in [`RunStage::Failed`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::config::{AppConfig, DatabaseConfig, CONFIG_FILE};
use crate::database::{load_to_db, Connection};
use crate::discovery::discover;
use crate::error::{DatabaseResult, PipelineError, PipelineResult};
use crate::export::write_csvs;
use crate::ingestion::{load_tables, LoadOptions};
use crate::naming::normalize_table_keys;
use crate::observability::{PipelineObserver, TracingObserver};
use crate::schema::derive_schemas;
use crate::staging::{archive_outputs, stage_files, PROCESSED_DIR, STAGING_DIR};

/// Stages of a run, in execution order, plus the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStage {
    Discover,
    Stage,
    Load,
    Normalize,
    Schema,
    Serialize,
    DbLoad,
    Archive,
    Done,
    Failed,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Files found by discovery.
    pub discovered: usize,
    /// Files that failed to load and were skipped.
    pub load_errors: usize,
    /// Table keys created/appended, in load order.
    pub tables: Vec<String>,
    /// Rows copied into the database.
    pub rows: u64,
}

/// Filesystem layout and behavior of a run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory scanned for sources and receiving the normalized CSVs.
    pub work_dir: PathBuf,
    /// Connection settings file.
    pub config_path: PathBuf,
    /// Where sources are moved before loading.
    pub staging_dir: PathBuf,
    /// Where normalized CSVs are moved after the load commits.
    pub processed_dir: PathBuf,
    pub load: LoadOptions,
}

impl PipelineOptions {
    /// Default layout rooted at `work_dir`.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        let work_dir = work_dir.as_ref().to_path_buf();
        Self {
            config_path: work_dir.join(CONFIG_FILE),
            staging_dir: work_dir.join(STAGING_DIR),
            processed_dir: work_dir.join(PROCESSED_DIR),
            work_dir,
            load: LoadOptions::default(),
        }
    }
}

/// One-shot import run.
pub struct Pipeline {
    options: PipelineOptions,
    observer: Arc<dyn PipelineObserver>,
}

impl Pipeline {
    /// Pipeline over `work_dir` with the default layout, logging through `tracing`.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self::with_options(PipelineOptions::new(work_dir))
    }

    pub fn with_options(options: PipelineOptions) -> Self {
        Self {
            options,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer (e.g. with a [`crate::observability::CompositeObserver`]).
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the config file location.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.config_path = path.into();
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Execute every stage. `connect` opens the database connection once the config is read.
    pub fn run<C, F>(&self, connect: F) -> PipelineResult<RunReport>
    where
        C: Connection,
        F: FnOnce(&DatabaseConfig) -> DatabaseResult<C>,
    {
        info!(dir = %self.options.work_dir.display(), "starting data import process");
        match self.run_stages(connect) {
            Ok(report) => {
                self.observer.on_stage(RunStage::Done);
                info!(
                    tables = report.tables.len(),
                    rows = report.rows,
                    load_errors = report.load_errors,
                    "all datasets have been imported successfully"
                );
                Ok(report)
            }
            Err(e) => {
                self.observer.on_stage(RunStage::Failed);
                error!(error = %e, "import failed");
                Err(e)
            }
        }
    }

    fn run_stages<C, F>(&self, connect: F) -> PipelineResult<RunReport>
    where
        C: Connection,
        F: FnOnce(&DatabaseConfig) -> DatabaseResult<C>,
    {
        let opts = &self.options;
        let observer = self.observer.as_ref();

        observer.on_stage(RunStage::Discover);
        let files = discover(&opts.work_dir)?;
        if files.is_empty() {
            return Err(PipelineError::NoDataFiles);
        }

        observer.on_stage(RunStage::Stage);
        let staged = stage_files(&files, &opts.work_dir, &opts.staging_dir)?;

        observer.on_stage(RunStage::Load);
        let names: Vec<&str> = staged.iter().map(|f| f.name.as_str()).collect();
        let outcome = load_tables(&names, &opts.staging_dir, observer, &opts.load);
        if outcome.tables.is_empty() {
            return Err(PipelineError::NoTablesLoaded {
                errors: outcome.errors,
            });
        }

        observer.on_stage(RunStage::Normalize);
        let tables = normalize_table_keys(outcome.tables);

        observer.on_stage(RunStage::Schema);
        let (tables, schemas) = derive_schemas(tables);

        observer.on_stage(RunStage::Serialize);
        write_csvs(&tables, &opts.work_dir)?;

        observer.on_stage(RunStage::DbLoad);
        let config = AppConfig::load(&opts.config_path)?;
        let mut conn = connect(&config.database)?;
        let summary = load_to_db(&mut conn, &schemas, &opts.work_dir)?;

        observer.on_stage(RunStage::Archive);
        archive_outputs(tables.keys(), &opts.work_dir, &opts.processed_dir)?;

        Ok(RunReport {
            discovered: files.len(),
            load_errors: outcome.errors,
            tables: tables.keys().map(str::to_string).collect(),
            rows: summary.rows,
        })
    }
}
