//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Every run logs to the console (stderr) and, unless disabled, to a per-run file named
//! `data_import_YYYYmmdd_HHMMSS.log`.
//!
//! # Log Levels
//!
//! - `error`: per-file load failures, rolled back transactions, fatal stage errors
//! - `warn`: name collisions, skipped unsupported files
//! - `info`: stage progress, summary counts, schemas
//! - `debug`: per-file discovery and loading detail

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter for this crate (error, warn, info, debug, trace).
    pub level: Level,
    /// Whether to use ANSI colors on the console.
    pub with_ansi: bool,
    /// Optional run log file. When set, events are also appended to it.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_ansi: true,
            log_file: None,
        }
    }
}

impl LogConfig {
    /// Create a `LogConfig` from CLI verbosity.
    ///
    /// - `quiet`: warn level
    /// - 0 (no `-v`): info level
    /// - 1 (`-v`): debug level
    /// - 2+ (`-vv`): trace level
    #[must_use]
    pub fn from_verbosity(verbosity: u8, quiet: bool) -> Self {
        let level = match (quiet, verbosity) {
            (true, _) => Level::WARN,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    /// Set the log file path (console only when None).
    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Timestamped run log path inside `dir`.
pub fn run_log_path(dir: &Path) -> PathBuf {
    dir.join(format!(
        "data_import_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Initialize the global tracing subscriber with the given configuration.
///
/// This should be called once at process start.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false);

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)
}

/// Build an `EnvFilter` from the given level, respecting `RUST_LOG` env var.
fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    // Dependencies stay at warn to keep the run log readable.
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,data_import={level}")))
}
