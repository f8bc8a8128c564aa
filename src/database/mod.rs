//! Transactional bulk load.
//!
//! [`load_to_db`] creates every table and copies its CSV inside one transaction. It talks to
//! the database through the [`Connection`] / [`Transaction`] seam; [`pg`] implements it for
//! the blocking `postgres` client.

pub mod pg;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{error, info};

use crate::error::DatabaseResult;
use crate::export::csv_path;
use crate::naming::{quote_identifier, validate_identifier};
use crate::schema::TableSchema;

pub use pg::connect;

/// A database session able to open a transaction.
pub trait Connection {
    fn begin(&mut self) -> DatabaseResult<Box<dyn Transaction + '_>>;
}

/// An open transaction. Dropping it without [`Transaction::commit`] must discard its work.
pub trait Transaction {
    /// Run a statement that returns no rows.
    fn execute(&mut self, statement: &str) -> DatabaseResult<()>;

    /// Run a `COPY ... FROM STDIN` statement, streaming `source` as its input.
    ///
    /// Returns the number of rows copied.
    fn copy_in(&mut self, statement: &str, source: &mut dyn Read) -> DatabaseResult<u64>;

    fn commit(self: Box<Self>) -> DatabaseResult<()>;

    fn rollback(self: Box<Self>) -> DatabaseResult<()>;
}

/// What a committed load wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub tables: usize,
    pub rows: u64,
}

/// `CREATE TABLE IF NOT EXISTS` for a schema, after checking every identifier. Names are
/// emitted quoted so reserved words work as table and column names.
pub fn create_table_statement(schema: &TableSchema) -> DatabaseResult<String> {
    let table = quote_identifier(validate_identifier(&schema.table)?);
    for column in &schema.columns {
        validate_identifier(&column.name)?;
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        schema.column_defs()
    ))
}

/// CSV `COPY ... FROM STDIN` for a table: header row skipped, comma-delimited, UTF-8.
pub fn copy_statement(table: &str) -> DatabaseResult<String> {
    let table = quote_identifier(validate_identifier(table)?);
    Ok(format!(
        "COPY {table} FROM STDIN WITH (FORMAT csv, HEADER true, DELIMITER ',', ENCODING 'UTF8')"
    ))
}

/// Create each table and bulk-copy `{csv_dir}/{table}.csv` into it, in a single transaction.
///
/// Commits once after the last table. On any failure the transaction is rolled back and the
/// error returned, so nothing from this call persists.
pub fn load_to_db<C>(conn: &mut C, schemas: &[TableSchema], csv_dir: &Path) -> DatabaseResult<LoadSummary>
where
    C: Connection + ?Sized,
{
    let mut tx = conn.begin()?;

    match load_all(tx.as_mut(), schemas, csv_dir) {
        Ok(summary) => {
            tx.commit()?;
            info!(
                tables = summary.tables,
                rows = summary.rows,
                "all tables created and data imported successfully"
            );
            Ok(summary)
        }
        Err(e) => {
            error!(error = %e, "failed to import data, rolling back");
            if let Err(rollback_err) = tx.rollback() {
                error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}

fn load_all(tx: &mut dyn Transaction, schemas: &[TableSchema], csv_dir: &Path) -> DatabaseResult<LoadSummary> {
    let mut summary = LoadSummary::default();

    for schema in schemas {
        let create = create_table_statement(schema)?;
        let copy = copy_statement(&schema.table)?;

        tx.execute(&create)?;

        let mut source = BufReader::new(File::open(csv_path(csv_dir, &schema.table))?);
        let rows = tx.copy_in(&copy, &mut source)?;
        info!(table = %schema.table, rows, "copied table");

        summary.tables += 1;
        summary.rows += rows;
    }
    Ok(summary)
}
