//! Locating source files in the working directory.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::PipelineResult;

/// Configuration files that live next to the data and are never loaded.
pub const RESERVED_NAMES: [&str; 2] = ["config.json", "config.template.json"];

/// Spreadsheet extensions accepted by discovery (lowercase, without the dot).
pub const SPREADSHEET_EXTENSIONS: [&str; 7] = ["xlsx", "xls", "xlsm", "xlsb", "odf", "ods", "odt"];

/// Source format family, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Comma-separated values.
    Csv,
    /// Workbook formats handled by the spreadsheet reader.
    Spreadsheet,
    /// A single JSON document.
    Json,
}

impl FileKind {
    /// Parse a kind from a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            e if SPREADSHEET_EXTENSIONS.contains(&e) => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Kind of a file name, or `None` if the extension is not supported.
    pub fn from_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A discovered source file, by base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawFileRef {
    pub name: String,
    pub kind: FileKind,
}

impl RawFileRef {
    /// Classify `name`, returning `None` for reserved or unsupported names.
    pub fn classify(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if RESERVED_NAMES.contains(&lower.as_str()) {
            debug!(file = name, "skipping config file");
            return None;
        }
        FileKind::from_name(name).map(|kind| Self {
            name: name.to_string(),
            kind,
        })
    }
}

/// List the supported data files directly inside `dir` (not recursive), sorted by name.
pub fn discover(dir: impl AsRef<Path>) -> PipelineResult<Vec<RawFileRef>> {
    let dir = dir.as_ref();
    let mut found = Vec::new();

    // Symlinks are followed so linked data files count as regular files.
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            debug!(path = %entry.path().display(), "skipping non-utf8 file name");
            continue;
        };
        if let Some(file) = RawFileRef::classify(name) {
            debug!(file = %file.name, kind = ?file.kind, "found data file");
            found.push(file);
        }
    }

    found.sort_by(|a, b| a.name.cmp(&b.name));
    let names: Vec<&str> = found.iter().map(|f| f.name.as_str()).collect();
    info!(dir = %dir.display(), count = found.len(), files = ?names, "discovered data files");
    Ok(found)
}
