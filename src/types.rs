//! Core data model for a run.
//!
//! Loaders produce [`Table`]s (ordered, named, equal-length [`Column`]s of typed [`Value`]s),
//! collected into a [`TableSet`] keyed by source name. Each pipeline stage takes the set by
//! value and hands a new one to the next stage.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{IngestionError, IngestionResult};

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
    /// Calendar date.
    Date(NaiveDate),
    /// Elapsed time.
    Interval(TimeDelta),
    /// UTF-8 string.
    Utf8(String),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl Value {
    /// Classification of this value, or `None` for [`Value::Null`].
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(ValueKind::Int {
                bits: 64,
                signed: true,
            }),
            Value::Float64(_) => Some(ValueKind::Float { bits: 64 }),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
            Value::Date(_) => Some(ValueKind::Date),
            Value::Interval(_) => Some(ValueKind::Interval),
            Value::Utf8(_) => Some(ValueKind::Text),
            Value::Binary(_) => Some(ValueKind::Binary),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Value-kind classification of a column, used to pick its SQL type.
///
/// See [`crate::schema::SqlType::from_kind`] for the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Integer of the given width (8, 16, 32 or 64 bits).
    Int { bits: u8, signed: bool },
    /// Floating point of the given width (16, 32 or 64 bits).
    Float { bits: u8 },
    /// Arbitrary-precision decimal.
    Decimal,
    Timestamp,
    Date,
    Interval,
    Bool,
    Text,
    Binary,
    /// No non-null values to classify.
    Unknown,
}

impl ValueKind {
    /// Smallest kind able to hold values of both `self` and `other`.
    ///
    /// Integers widen to floats, dates widen to timestamps, and anything else that disagrees
    /// falls back to [`ValueKind::Text`].
    pub fn unify(self, other: ValueKind) -> ValueKind {
        use ValueKind::*;

        match (self, other) {
            (a, b) if a == b => a,
            (Unknown, k) | (k, Unknown) => k,
            (Int { bits: a, signed: sa }, Int { bits: b, signed: sb }) => Int {
                bits: a.max(b),
                signed: sa || sb,
            },
            (Float { bits: a }, Float { bits: b }) => Float { bits: a.max(b) },
            (Int { .. }, Float { .. }) | (Float { .. }, Int { .. }) => Float { bits: 64 },
            (Int { .. }, Decimal) | (Decimal, Int { .. }) => Decimal,
            (Float { .. }, Decimal) | (Decimal, Float { .. }) => Float { bits: 64 },
            (Date, Timestamp) | (Timestamp, Date) => Timestamp,
            _ => Text,
        }
    }
}

/// A named sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Single classification covering every non-null value in the column.
    pub fn kind(&self) -> ValueKind {
        self.values
            .iter()
            .filter_map(Value::kind)
            .fold(ValueKind::Unknown, ValueKind::unify)
    }
}

/// In-memory rectangular dataset.
///
/// All columns have the same number of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting columns of unequal length.
    pub fn new(columns: Vec<Column>) -> IngestionResult<Self> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(IngestionError::RaggedTable {
                    column: bad.name.clone(),
                    expected,
                    actual: bad.values.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Iterate rows as borrowed cells, in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count()).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Replace every column name with `rename(name)`; values are untouched.
    pub fn rename_columns<F>(mut self, mut rename: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        for column in &mut self.columns {
            column.name = rename(&column.name);
        }
        self
    }
}

/// Ordered mapping of table key to [`Table`] that flows through the whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    entries: Vec<(String, Table)>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, table: Table) {
        self.entries.push((key.into(), table));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Table> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, t)| t)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.entries.iter().map(|(k, t)| (k.as_str(), t))
    }
}

impl IntoIterator for TableSet {
    type Item = (String, Table);
    type IntoIter = std::vec::IntoIter<(String, Table)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Table)> for TableSet {
    fn from_iter<I: IntoIterator<Item = (String, Table)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
