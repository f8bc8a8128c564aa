//! Reading staged files into in-memory tables.
//!
//! Most callers should use [`load_tables`] (from [`unified`]) which:
//!
//! - picks a reader by file extension
//! - expands multi-sheet workbooks into one table per sheet
//! - reports success/failure/alerts to a [`crate::observability::PipelineObserver`]
//!
//! Format-specific readers are also available under:
//! - [`csv`]
//! - [`json`]
//! - `excel` (cargo feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod unified;

pub use unified::{load_tables, sheet_keys, LoadOptions, LoadOutcome};
