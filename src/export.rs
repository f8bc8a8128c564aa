//! Writing tables back out as normalized CSV, the source format for bulk copy.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Table, TableSet, Value};

/// Path of the CSV written for `key` inside `dir`.
pub fn csv_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.csv"))
}

/// Write every table to `{dir}/{key}.csv`, overwriting existing files.
pub fn write_csvs(tables: &TableSet, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    tables
        .iter()
        .map(|(key, table)| {
            let path = csv_path(dir, key);
            write_csv(table, &path)?;
            info!(table = key, rows = table.row_count(), path = %path.display(), "saved csv");
            Ok(path)
        })
        .collect()
}

/// Write one table with a header row of its column names and no index column.
pub fn write_csv(table: &Table, path: &Path) -> PipelineResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    write_table(table, &mut wtr)?;
    wtr.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Write a table to any CSV writer.
pub fn write_table<W: std::io::Write>(table: &Table, wtr: &mut csv::Writer<W>) -> csv::Result<()> {
    if table.columns().is_empty() {
        return Ok(());
    }
    wtr.write_record(table.column_names())?;
    for row in table.rows() {
        wtr.write_record(row.into_iter().map(|v| render_value(v).into_owned()))?;
    }
    Ok(())
}

/// Text form of a value as PostgreSQL's CSV `COPY` expects it. `Null` is an empty field.
pub fn render_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::Int64(i) => Cow::Owned(i.to_string()),
        Value::Float64(f) if f.is_infinite() => {
            Cow::Borrowed(if *f > 0.0 { "Infinity" } else { "-Infinity" })
        }
        Value::Float64(f) if f.is_nan() => Cow::Borrowed("NaN"),
        Value::Float64(f) => Cow::Owned(f.to_string()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Timestamp(ts) => Cow::Owned(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        Value::Interval(td) => Cow::Owned(match td.num_microseconds() {
            Some(us) => format!("{us} microseconds"),
            None => format!("{} milliseconds", td.num_milliseconds()),
        }),
        Value::Utf8(s) => Cow::Borrowed(s.as_str()),
        Value::Binary(bytes) => Cow::Owned(format!("\\x{}", hex::encode(bytes))),
    }
}
