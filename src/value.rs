// used to bind values as query parameters
use rusqlite::types::{ToSql, ToSqlOutput};

// used for timestamp fields
use chrono::{DateTime, Utc};

// used to print out readable forms of a value
use std::fmt;

/// A filter value after coercion to the declared kind of its field.
///
/// Values are produced by [`crate::schema::FieldKind`] coercions and consumed
/// by executors as bound parameters. They never carry SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int8(i8),
    Int32(i32),
    Int64(i64),
    /// A member of an enumeration field, stored by its symbol.
    Symbol(&'static str),
    Timestamp(DateTime<Utc>),
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            Value::Bool(b) => Ok(ToSqlOutput::from(*b)),
            Value::Int8(i) => Ok(ToSqlOutput::from(*i)),
            Value::Int32(i) => Ok(ToSqlOutput::from(*i)),
            Value::Int64(i) => Ok(ToSqlOutput::from(*i)),
            Value::Symbol(s) => Ok(ToSqlOutput::from(*s)),
            // same representation rusqlite uses when entities are stored
            Value::Timestamp(t) => t.to_sql(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int8(i) => write!(f, "{}", i),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Timestamp(t) => write!(f, "'{}'", t.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}
