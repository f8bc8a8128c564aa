use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::info;

use data_import::database::connect;
use data_import::logging::{init_logging, run_log_path, LogConfig};
use data_import::pipeline::Pipeline;

/// Load CSV, JSON and spreadsheet files from a directory into PostgreSQL.
#[derive(Debug, Parser)]
#[command(name = "data-import", version, about)]
struct Cli {
    /// Working directory holding the source files and config.json.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Config file with database settings (defaults to <dir>/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Directory for the run log file (defaults to <dir>).
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log to the console only.
    #[arg(long)]
    no_log_file: bool,

    /// Disable colored console output.
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = (!cli.no_log_file)
        .then(|| run_log_path(cli.log_dir.as_deref().unwrap_or(&cli.dir)));
    let log_config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_log_file(log_file)
        .with_ansi(!cli.no_color);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let mut pipeline = Pipeline::new(&cli.dir);
    if let Some(path) = cli.config {
        pipeline = pipeline.with_config_path(path);
    }

    match pipeline.run(connect) {
        Ok(report) => {
            info!(tables = ?report.tables, "done");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::from(1),
    }
}
