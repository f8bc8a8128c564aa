//! `data-import` is a one-shot ETL tool: it picks up tabular files (CSV, JSON, spreadsheets)
//! from a working directory, normalizes their names, infers a SQL schema and bulk-loads one
//! PostgreSQL table per source table inside a single transaction.
//!
//! The primary entrypoint is [`pipeline::Pipeline::run`]; the stages it drives are also
//! usable on their own.
//!
//! ## Run layout
//!
//! - sources found in the working directory ([`discovery`]) are moved to `unprocessed_data/`
//!   ([`staging`])
//! - each source becomes one or more [`types::Table`]s ([`ingestion`]); workbooks with several
//!   sheets produce one table per sheet
//! - table keys and column names are normalized ([`naming`]) and typed ([`schema`])
//! - tables are written as `{key}.csv` ([`export`]) and copied into the database
//!   ([`database`]), all in one transaction
//! - the CSVs are moved to `processed_data/`
//!
//! ## Name normalization
//!
//! ```rust
//! use data_import::naming::normalize;
//!
//! assert_eq!(normalize("Müşteri Listesi 2024.xlsx"), "musteri_listesi_2024");
//! assert_eq!(normalize("2024 Sales"), "col_2024_sales");
//! ```
//!
//! ## Schema derivation
//!
//! ```rust
//! use data_import::schema::derive_schemas;
//! use data_import::types::{Column, Table, TableSet, Value};
//!
//! let table = Table::new(vec![
//!     Column::new("Order ID", vec![Value::Int64(1), Value::Int64(2)]),
//!     Column::new("Price", vec![Value::Float64(9.5), Value::Null]),
//! ])
//! .unwrap();
//! let mut tables = TableSet::new();
//! tables.push("orders", table);
//!
//! let (_tables, schemas) = derive_schemas(tables);
//! assert_eq!(schemas[0].column_defs(), r#""order_id" BIGINT, "price" DOUBLE PRECISION"#);
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: run orchestration
//! - [`discovery`], [`staging`]: finding and moving files
//! - [`ingestion`]: CSV/JSON/spreadsheet readers
//! - [`naming`], [`schema`], [`export`]: normalization, type mapping, CSV output
//! - [`database`]: transactional bulk load
//! - [`config`], [`logging`], [`observability`], [`error`]: ambient plumbing

pub mod config;
pub mod database;
pub mod discovery;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod logging;
pub mod naming;
pub mod observability;
pub mod pipeline;
pub mod schema;
pub mod staging;
pub mod types;

pub use error::{DatabaseError, IngestionError, PipelineError, PipelineResult};
