//! Moving files in and out of the working directory.
//!
//! [`stage_files`] relocates the discovered sources into the staging directory before they
//! are read; [`archive_outputs`] moves the normalized CSVs into the processed directory after
//! the load has committed.

use std::fs;
use std::path::Path;

use tracing::{error, info};

use crate::discovery::RawFileRef;
use crate::error::{PipelineError, PipelineResult};

/// Staging directory name, relative to the working directory.
pub const STAGING_DIR: &str = "unprocessed_data";

/// Archive directory name, relative to the working directory.
pub const PROCESSED_DIR: &str = "processed_data";

/// Move `files` from `source_dir` into `staging_dir`, keeping their base names.
///
/// The staging directory is created if missing; failing to create it is fatal. A file that
/// cannot be moved is logged and left out of the returned list, and the rest still move.
pub fn stage_files(
    files: &[RawFileRef],
    source_dir: &Path,
    staging_dir: &Path,
) -> PipelineResult<Vec<RawFileRef>> {
    fs::create_dir_all(staging_dir).map_err(|e| {
        error!(dir = %staging_dir.display(), error = %e, "error creating staging directory");
        PipelineError::io(staging_dir, e)
    })?;
    info!(dir = %staging_dir.display(), "staging directory ready");

    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let from = source_dir.join(&file.name);
        let to = staging_dir.join(&file.name);
        match fs::rename(&from, &to) {
            Ok(()) => {
                info!(file = %file.name, dir = %staging_dir.display(), "moved file to staging");
                staged.push(file.clone());
            }
            Err(e) => error!(file = %file.name, error = %e, "error moving file"),
        }
    }
    Ok(staged)
}

/// Move `{key}.csv` for every key from `source_dir` into `processed_dir`.
///
/// Any failure aborts and is returned; the data is already committed at this point, so the
/// remaining CSVs simply stay in the working directory.
pub fn archive_outputs<'a, I>(keys: I, source_dir: &Path, processed_dir: &Path) -> PipelineResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    fs::create_dir_all(processed_dir).map_err(|e| {
        error!(dir = %processed_dir.display(), error = %e, "error creating processed directory");
        PipelineError::io(processed_dir, e)
    })?;
    info!(dir = %processed_dir.display(), "processed directory ready");

    for key in keys {
        let csv_name = format!("{key}.csv");
        let from = source_dir.join(&csv_name);
        fs::rename(&from, processed_dir.join(&csv_name)).map_err(|e| {
            error!(file = %csv_name, error = %e, "error moving processed file");
            PipelineError::io(&from, e)
        })?;
        info!(file = %csv_name, dir = %processed_dir.display(), "archived processed file");
    }
    Ok(())
}
