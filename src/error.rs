use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Convenience result type for whole-run operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error returned when a single source file cannot be turned into tables.
///
/// These are recoverable: the loader logs them, counts them and moves on to the next file.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet parsing error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV parsing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The file is not a syntactically valid JSON document.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// The input parsed but does not have a tabular shape.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The file extension has no reader.
    #[error("unsupported file type: {name}")]
    Unsupported { name: String },

    /// Columns passed to [`crate::types::Table::new`] have different lengths.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    RaggedTable {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Error raised while creating tables or copying data into them.
///
/// Any of these aborts the load transaction.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Driver-level failure (connection, statement, COPY protocol).
    #[error("postgres error: {0}")]
    Postgres(#[from] postgres::Error),

    /// Reading the CSV source for a bulk copy failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A table or column name failed the identifier allow-list.
    #[error("invalid sql identifier {name:?}: {reason}")]
    InvalidIdentifier { name: String, reason: &'static str },
}

/// Error that terminates a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Filesystem failure tied to a specific path.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory listing failure during discovery.
    #[error("failed to list directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Writing a normalized CSV failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// `config.json` is missing or malformed.
    #[error("config error at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The load transaction failed and was rolled back.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Discovery returned nothing.
    #[error("no data files found to process")]
    NoDataFiles,

    /// Every discovered file failed to load.
    #[error("failed to process any data files ({errors} errors)")]
    NoTablesLoaded { errors: usize },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
