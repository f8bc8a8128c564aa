//! Unified loading entrypoint.
//!
//! [`load_tables`] reads a batch of staged files into a [`TableSet`], dispatching on the file
//! extension. Individual failures are reported to the observer, counted and skipped; the batch
//! never aborts on one bad file.

use std::path::Path;

use tracing::{debug, info};

use crate::discovery::FileKind;
use crate::error::{IngestionError, IngestionResult};
use crate::naming::normalize;
use crate::observability::{IngestionContext, IngestionSeverity, IngestionStats, PipelineObserver};
use crate::types::{Table, TableSet};

use super::{csv, json};

/// Result of loading a batch of files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    /// Tables keyed by source name (or `{stem}_{sheet}.xlsx` for multi-sheet workbooks).
    pub tables: TableSet,
    /// Number of files that could not be loaded.
    pub errors: usize,
}

/// Options controlling batch loading.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load every file in `files` from `source_dir`.
///
/// Returns whatever loaded successfully plus the number of failures; deciding whether that is
/// enough to continue is up to the caller.
pub fn load_tables<S: AsRef<str>>(
    files: &[S],
    source_dir: &Path,
    observer: &dyn PipelineObserver,
    options: &LoadOptions,
) -> LoadOutcome {
    info!(dir = %source_dir.display(), "loading data files");
    let mut outcome = LoadOutcome::default();

    for name in files {
        let name = name.as_ref();
        let ctx = IngestionContext {
            path: source_dir.join(name),
            kind: FileKind::from_name(name),
        };

        match load_file(name, &ctx) {
            Ok(tables) => {
                let stats = IngestionStats {
                    tables: tables.len(),
                    rows: tables.iter().map(|(_, t)| t.row_count()).sum(),
                };
                observer.on_success(&ctx, stats);
                for (key, table) in tables {
                    outcome.tables.push(key, table);
                }
            }
            Err(e) => {
                let severity = IngestionSeverity::for_error(&e);
                observer.on_failure(&ctx, severity, &e);
                if severity >= options.alert_at_or_above {
                    observer.on_alert(&ctx, severity, &e);
                }
                outcome.errors += 1;
            }
        }
        debug!(file = name, "finished processing");
    }

    info!(
        tables = outcome.tables.len(),
        errors = outcome.errors,
        "data loading completed"
    );
    outcome
}

/// Load one file into one or more keyed tables.
fn load_file(name: &str, ctx: &IngestionContext) -> IngestionResult<Vec<(String, Table)>> {
    match ctx.kind {
        Some(FileKind::Csv) => Ok(vec![(name.to_string(), csv::read_csv_from_path(&ctx.path)?)]),
        Some(FileKind::Json) => Ok(vec![(name.to_string(), json::read_json_from_path(&ctx.path)?)]),
        Some(FileKind::Spreadsheet) => load_spreadsheet(name, &ctx.path),
        None => Err(IngestionError::Unsupported {
            name: name.to_string(),
        }),
    }
}

#[cfg(feature = "excel")]
fn load_spreadsheet(name: &str, path: &Path) -> IngestionResult<Vec<(String, Table)>> {
    let sheets = super::excel::read_workbook_from_path(path)?;
    Ok(sheet_keys(name, sheets))
}

#[cfg(not(feature = "excel"))]
fn load_spreadsheet(_name: &str, _path: &Path) -> IngestionResult<Vec<(String, Table)>> {
    Err(IngestionError::SchemaMismatch {
        message: "spreadsheet ingestion not enabled (enable cargo feature 'excel')".to_string(),
    })
}

/// Key workbook sheets: a single sheet keeps the file name, several sheets get
/// `{stem}_{normalized sheet}.xlsx` each.
pub fn sheet_keys(file_name: &str, sheets: Vec<(String, Table)>) -> Vec<(String, Table)> {
    if sheets.len() == 1 {
        return sheets
            .into_iter()
            .map(|(_, table)| (file_name.to_string(), table))
            .collect();
    }

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    sheets
        .into_iter()
        .map(|(sheet, table)| {
            let key = format!("{stem}_{}.xlsx", normalize(&sheet));
            debug!(file = file_name, %sheet, %key, "loaded sheet");
            (key, table)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sheet_keeps_file_name() {
        let keys: Vec<String> = sheet_keys("Report.ods", vec![("Sheet1".into(), Table::default())])
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["Report.ods"]);
    }

    #[test]
    fn multiple_sheets_get_xlsx_suffixed_keys() {
        let sheets = vec![
            ("Q1 Sales".into(), Table::default()),
            ("Özet".into(), Table::default()),
        ];
        let keys: Vec<String> = sheet_keys("book.xls", sheets)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["book_q1_sales.xlsx", "book_ozet.xlsx"]);
    }
}
