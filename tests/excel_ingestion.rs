#![cfg(feature = "excel")]

use std::path::Path;

use data_import::ingestion::excel::read_workbook_from_path;
use data_import::ingestion::{load_tables, LoadOptions};
use data_import::observability::TracingObserver;
use data_import::types::{Value, ValueKind};

fn write_people_sheet(ws: &mut rust_xlsxwriter::Worksheet, rows: &[(f64, &str, f64, bool)]) {
    ws.write_string(0, 0, "id").unwrap();
    ws.write_string(0, 1, "name").unwrap();
    ws.write_string(0, 2, "score").unwrap();
    ws.write_string(0, 3, "active").unwrap();
    for (i, (id, name, score, active)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        ws.write_number(r, 0, *id).unwrap();
        ws.write_string(r, 1, *name).unwrap();
        ws.write_number(r, 2, *score).unwrap();
        ws.write_boolean(r, 3, *active).unwrap();
    }
}

fn write_single_sheet(path: &Path) {
    let mut wb = rust_xlsxwriter::Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Sheet1").unwrap();
    write_people_sheet(ws, &[(1.0, "Ada", 98.5, true), (2.0, "Grace", 87.25, false)]);
    wb.save(path).unwrap();
}

fn write_multi_sheet(path: &Path) {
    let mut wb = rust_xlsxwriter::Workbook::new();

    let ws = wb.add_worksheet();
    ws.set_name("Q1 Sales").unwrap();
    write_people_sheet(ws, &[(1.0, "Ada", 98.5, true), (2.0, "Grace", 87.25, false)]);

    let ws = wb.add_worksheet();
    ws.set_name("Özet").unwrap();
    write_people_sheet(ws, &[(3.0, "Linus", 70.0, true)]);

    wb.save(path).unwrap();
}

#[test]
fn reads_single_sheet_with_typed_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.xlsx");
    write_single_sheet(&path);

    let sheets = read_workbook_from_path(&path).unwrap();

    assert_eq!(sheets.len(), 1);
    let (name, table) = &sheets[0];
    assert_eq!(name, "Sheet1");
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["id", "name", "score", "active"]
    );
    assert_eq!(table.columns()[0].values, vec![Value::Int64(1), Value::Int64(2)]);
    assert_eq!(table.columns()[2].kind(), ValueKind::Float { bits: 64 });
    assert_eq!(table.columns()[3].values, vec![Value::Bool(true), Value::Bool(false)]);
}

#[test]
fn header_is_first_non_empty_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offset.xlsx");
    let mut wb = rust_xlsxwriter::Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(2, 0, "city").unwrap();
    ws.write_string(3, 0, "Ankara").unwrap();
    wb.save(&path).unwrap();

    let sheets = read_workbook_from_path(&path).unwrap();
    let table = &sheets[0].1;

    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["city"]);
    assert_eq!(table.columns()[0].values, vec![Value::Utf8("Ankara".to_string())]);
}

#[test]
fn empty_sheet_becomes_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.xlsx");
    let mut wb = rust_xlsxwriter::Workbook::new();
    wb.add_worksheet();
    wb.save(&path).unwrap();

    let sheets = read_workbook_from_path(&path).unwrap();
    assert_eq!(sheets.len(), 1);
    assert!(sheets[0].1.columns().is_empty());
}

#[test]
fn load_tables_keys_single_and_multi_sheet_workbooks() {
    let dir = tempfile::tempdir().unwrap();
    write_single_sheet(&dir.path().join("people.xlsx"));
    write_multi_sheet(&dir.path().join("Report 2024.xlsx"));

    let outcome = load_tables(
        &["people.xlsx", "Report 2024.xlsx"],
        dir.path(),
        &TracingObserver,
        &LoadOptions::default(),
    );

    assert_eq!(outcome.errors, 0);
    assert_eq!(
        outcome.tables.keys().collect::<Vec<_>>(),
        vec![
            "people.xlsx",
            "Report 2024_q1_sales.xlsx",
            "Report 2024_ozet.xlsx"
        ]
    );
    assert_eq!(outcome.tables.get("Report 2024_ozet.xlsx").unwrap().row_count(), 1);
}

#[test]
fn corrupt_workbook_is_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.xlsx"), b"not a zip archive").unwrap();
    write_single_sheet(&dir.path().join("ok.xlsx"));

    let outcome = load_tables(
        &["broken.xlsx", "ok.xlsx"],
        dir.path(),
        &TracingObserver,
        &LoadOptions::default(),
    );

    assert_eq!(outcome.errors, 1);
    assert_eq!(outcome.tables.keys().collect::<Vec<_>>(), vec!["ok.xlsx"]);
}
