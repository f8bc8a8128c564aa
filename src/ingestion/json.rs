//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A single JSON object: `{"a":1}` (one row)
//! - A JSON array of objects: `[{"a":1}, {"a":2}]` (one row per object)
//!
//! Nested objects are flattened into `_`-joined column paths (`{"user":{"name":..}}` becomes
//! `user_name`). Arrays nested inside a row are kept as their JSON text.

use std::fs;
use std::path::Path;

use serde_json::Map;
use tracing::warn;

use crate::error::{IngestionError, IngestionResult};
use crate::naming::UniqueNames;
use crate::types::{Column, Table, Value};

/// Separator used when joining nested object keys into a column name.
pub const PATH_SEPARATOR: &str = "_";

/// Read a JSON document into a [`Table`].
pub fn read_json_from_path(path: impl AsRef<Path>) -> IngestionResult<Table> {
    let text = fs::read_to_string(path)?;
    read_json_from_str(&text)
}

/// Read a JSON document held in memory into a [`Table`].
pub fn read_json_from_str(input: &str) -> IngestionResult<Table> {
    let doc: serde_json::Value = serde_json::from_str(input)?;

    let records: Vec<Map<String, serde_json::Value>> = match doc {
        serde_json::Value::Object(obj) => vec![obj],
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx0, item)| match item {
                serde_json::Value::Object(obj) => Ok(obj),
                other => Err(IngestionError::SchemaMismatch {
                    message: format!("row {} is not a json object (got {other})", idx0 + 1),
                }),
            })
            .collect::<IngestionResult<_>>()?,
        _ => {
            return Err(IngestionError::SchemaMismatch {
                message: "json must be an object or an array of objects".to_string(),
            });
        }
    };

    let flat: Vec<Vec<(String, Value)>> = records
        .iter()
        .map(|obj| {
            let mut out = Vec::new();
            flatten_object(obj, None, &mut out);
            dedupe_paths(out)
        })
        .collect();

    // Column order follows first appearance across rows.
    let mut names: Vec<String> = Vec::new();
    for row in &flat {
        for (name, _) in row {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }

    let mut columns: Vec<Column> = names
        .into_iter()
        .map(|name| Column::new(name, Vec::with_capacity(flat.len())))
        .collect();
    for mut row in flat {
        for column in &mut columns {
            let value = row
                .iter()
                .position(|(name, _)| *name == column.name)
                .map(|idx| row.swap_remove(idx).1)
                .unwrap_or(Value::Null);
            column.values.push(value);
        }
    }

    Table::new(columns)
}

fn flatten_object(
    obj: &Map<String, serde_json::Value>,
    prefix: Option<&str>,
    out: &mut Vec<(String, Value)>,
) {
    for (key, value) in obj {
        let path = match prefix {
            Some(p) => format!("{p}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            serde_json::Value::Object(nested) if !nested.is_empty() => {
                flatten_object(nested, Some(&path), out)
            }
            other => out.push((path, convert_json_value(other))),
        }
    }
}

/// A flattened path can equal a literal key (`{"a_b":1,"a":{"b":2}}`); later duplicates
/// within a row get `_2`, `_3`, ... so no value is lost.
fn dedupe_paths(row: Vec<(String, Value)>) -> Vec<(String, Value)> {
    let mut unique = UniqueNames::new();
    row.into_iter()
        .map(|(path, value)| {
            let assigned = unique.claim(path.clone());
            if assigned != path {
                warn!(%path, %assigned, "flattened json path collides, using suffix");
            }
            (assigned, value)
        })
        .collect()
}

fn convert_json_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float64(f)
            } else {
                Value::Utf8(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}
