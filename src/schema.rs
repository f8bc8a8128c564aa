//! SQL schema derivation.
//!
//! [`derive_schemas`] normalizes every table's column names and maps each column's
//! [`ValueKind`] to a [`SqlType`], producing one [`TableSchema`] per table.

use std::fmt;

use tracing::info;

use crate::naming::{normalize_unique, quote_identifier};
use crate::types::{Table, TableSet, ValueKind};

/// Column types emitted in `CREATE TABLE` statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Numeric,
    Timestamp,
    Date,
    Interval,
    Boolean,
    Varchar,
    Bytea,
}

impl SqlType {
    /// Total mapping from value kind to SQL type; anything unrecognized is `VARCHAR`.
    pub fn from_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Int { bits: 8, .. } => Self::SmallInt,
            ValueKind::Int { bits: 16, signed: true } => Self::SmallInt,
            ValueKind::Int { bits: 16, signed: false } => Self::Integer,
            ValueKind::Int { bits: 32, signed: true } => Self::Integer,
            ValueKind::Int { bits: 32, signed: false } => Self::BigInt,
            ValueKind::Int { bits: 64, .. } => Self::BigInt,
            ValueKind::Float { bits: 16 | 32 } => Self::Real,
            ValueKind::Float { bits: 64 } => Self::DoublePrecision,
            ValueKind::Decimal => Self::Numeric,
            ValueKind::Timestamp => Self::Timestamp,
            ValueKind::Date => Self::Date,
            ValueKind::Interval => Self::Interval,
            ValueKind::Bool => Self::Boolean,
            ValueKind::Binary => Self::Bytea,
            _ => Self::Varchar,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::DoublePrecision => "DOUBLE PRECISION",
            Self::Numeric => "NUMERIC",
            Self::Timestamp => "TIMESTAMP",
            Self::Date => "DATE",
            Self::Interval => "INTERVAL",
            Self::Boolean => "BOOLEAN",
            Self::Varchar => "VARCHAR",
            Self::Bytea => "BYTEA",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub sql_type: SqlType,
}

/// Ordered column definitions for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Derive the schema of an already-normalized table.
    pub fn of(key: &str, table: &Table) -> Self {
        Self {
            table: key.to_string(),
            columns: table
                .columns()
                .iter()
                .map(|c| ColumnSchema {
                    name: c.name.clone(),
                    sql_type: SqlType::from_kind(c.kind()),
                })
                .collect(),
        }
    }

    /// `"name" TYPE, "name" TYPE`, in column order. Empty for a table without columns.
    pub fn column_defs(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.sql_type))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Normalize column names (suffixing collisions) without touching values.
pub fn normalize_columns(key: &str, table: Table) -> Table {
    let originals: Vec<String> = table.column_names().map(str::to_string).collect();
    let mut renamed = normalize_unique(key, originals.iter().map(String::as_str)).into_iter();
    table.rename_columns(|old| renamed.next().unwrap_or_else(|| old.to_string()))
}

/// Normalize column names and derive a schema for every table.
///
/// Tables are independent of each other; the returned set keeps their order.
pub fn derive_schemas(tables: TableSet) -> (TableSet, Vec<TableSchema>) {
    let mut schemas = Vec::with_capacity(tables.len());
    let tables: TableSet = tables
        .into_iter()
        .map(|(key, table)| {
            let table = normalize_columns(&key, table);
            let schema = TableSchema::of(&key, &table);
            info!(table = %key, schema = %schema.column_defs(), "schema created");
            schemas.push(schema);
            (key, table)
        })
        .collect();
    (tables, schemas)
}
