#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Column, Table, Value};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Read every sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.), in workbook order.
///
/// Behavior per sheet:
/// - Detects the first non-empty row as the header row
/// - Reads remaining rows and converts cells into typed `Value`s
/// - A sheet with no non-empty rows becomes a table with no columns
pub fn read_workbook_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<(String, Table)>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheets = workbook.sheet_names().to_vec();
    if sheets.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "workbook has no sheets".to_string(),
        });
    }

    let mut out = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        let table = read_sheet_range(&range).map_err(|e| wrap_err_with_sheet(&sheet, e))?;
        out.push((sheet, table));
    }
    Ok(out)
}

fn read_sheet_range(range: &calamine::Range<Data>) -> IngestionResult<Table> {
    let Some(header_row_idx) = range
        .rows()
        .position(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
    else {
        return Ok(Table::default());
    };

    let mut rows = range.rows().skip(header_row_idx);
    let header: Vec<String> = rows
        .next()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, c)| match cell_to_header_string(c) {
                    h if h.trim().is_empty() => format!("Unnamed: {idx}"),
                    h => h,
                })
                .collect()
        })
        .unwrap_or_default();

    let mut columns: Vec<Column> = header
        .into_iter()
        .map(|name| Column::new(name, Vec::new()))
        .collect();
    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            let cell = row.get(idx).unwrap_or(&Data::Empty);
            column.values.push(convert_cell(cell));
        }
    }

    Table::new(columns)
}

fn wrap_err_with_sheet(sheet: &str, err: IngestionError) -> IngestionError {
    match err {
        IngestionError::SchemaMismatch { message } => IngestionError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::DateTime(dt) if dt.is_duration() => {
            TimeDelta::try_milliseconds((dt.as_f64() * SECONDS_PER_DAY * 1_000.0).round() as i64)
                .map_or(Value::Null, Value::Interval)
        }
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64()).map_or(Value::Null, Value::Timestamp),
        Data::DateTimeIso(s) => parse_iso_datetime(s),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}

/// Integral floats come back as integers; spreadsheets store every number as a float.
fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::Int64(f as i64)
    } else {
        Value::Float64(f)
    }
}

/// Convert an Excel serial date (days since 1899-12-30, 1900 date system) to a timestamp.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * SECONDS_PER_DAY * 1_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn parse_iso_datetime(s: &str) -> Value {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Value::Timestamp(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Value::Date(d);
    }
    Value::Utf8(s.to_string())
}
