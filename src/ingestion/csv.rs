//! CSV ingestion implementation.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::IngestionResult;
use crate::types::{Column, Table, Value};

/// Cell contents treated as missing, matching common spreadsheet/pandas exports.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Read a CSV file (header row required) into a [`Table`].
///
/// Every column's type is inferred from its text: booleans, integers, floats, dates and
/// timestamps are recognized when all non-missing cells agree; anything else stays text.
pub fn read_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader.
pub fn read_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<Table> {
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(&cells)))
        .collect();
    Table::new(columns)
}

/// Text type candidates, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextType {
    Bool,
    Int,
    Float,
    Date,
    Timestamp,
    Text,
}

const CANDIDATES: [TextType; 5] = [
    TextType::Bool,
    TextType::Int,
    TextType::Float,
    TextType::Date,
    TextType::Timestamp,
];

/// Convert a column of raw text into typed values using one type for the whole column.
pub fn infer_column(cells: &[String]) -> Vec<Value> {
    let present: Vec<&str> = cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !is_na(c))
        .collect();

    let chosen = CANDIDATES
        .into_iter()
        .find(|&t| !present.is_empty() && present.iter().all(|c| parse_as(t, c).is_some()))
        .unwrap_or(TextType::Text);

    cells
        .iter()
        .map(|cell| {
            let trimmed = cell.trim();
            if is_na(trimmed) {
                Value::Null
            } else if chosen == TextType::Text {
                Value::Utf8(cell.clone())
            } else {
                parse_as(chosen, trimmed).unwrap_or(Value::Null)
            }
        })
        .collect()
}

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

fn parse_as(t: TextType, s: &str) -> Option<Value> {
    match t {
        TextType::Bool => parse_bool(s).map(Value::Bool),
        TextType::Int => s.parse::<i64>().ok().map(Value::Int64),
        TextType::Float => s.parse::<f64>().ok().map(Value::Float64),
        TextType::Date => NaiveDate::parse_from_str(s, DATE_FORMAT).ok().map(Value::Date),
        TextType::Timestamp => TIMESTAMP_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
            .map(Value::Timestamp),
        TextType::Text => Some(Value::Utf8(s.to_string())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
