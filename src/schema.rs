//! Per-entity field registries.
//!
//! Every searchable entity describes itself once through an [`EntitySchema`]:
//! a table of dot-addressable field paths, the column each path maps to, and
//! the [`FieldKind`] that decides how untyped filter values are coerced.
//! Schemas are meant to be built a single time and shared, typically from a
//! `lazy_static` block next to the entity definition:
//!
//! ```
//! use lazy_static::lazy_static;
//! use rowsift::schema::{Entity, EntitySchema, FieldKind};
//!
//! struct Gadget;
//!
//! lazy_static! {
//!     static ref GADGET: EntitySchema = EntitySchema::new("Gadget", "gadget")
//!         .field("id", "id", FieldKind::Int64)
//!         .field("name", "name", FieldKind::Text)
//!         .field("owner.id", "owner_id", FieldKind::Text);
//! }
//!
//! impl Entity for Gadget {
//!     fn schema() -> &'static EntitySchema { &GADGET }
//! }
//!
//! assert!(Gadget::schema().resolve("Gadget", "Gadget.owner.id").is_some());
//! ```

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use chrono::{DateTime, Utc};
use seahash::SeaHasher;

use crate::error::{Result, SiftError};
use crate::value::Value;

pub type FieldHasher = BuildHasherDefault<SeaHasher>;

/// Declared type of a field, selecting the coercion applied to filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    Int8,
    Int32,
    Int64,
    Timestamp,
    /// Stored as the symbol text; the slice lists every valid symbol.
    Enumeration(&'static [&'static str]),
}

impl FieldKind {
    /// Coerces a value for equality, using the native representation of the field.
    pub fn coerce_native(&self, path: &str, raw: &str) -> Result<Value> {
        match self {
            FieldKind::Text => Ok(Value::Text(raw.to_string())),
            FieldKind::Bool => Ok(Self::coerce_bool(raw)),
            FieldKind::Int8 | FieldKind::Int32 | FieldKind::Int64 => self.coerce_integer(path, raw),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
                .map_err(|e| invalid_value(path, raw, e.to_string())),
            FieldKind::Enumeration(symbols) => symbols
                .iter()
                .find(|symbol| **symbol == raw)
                .map(|symbol| Value::Symbol(*symbol))
                .ok_or_else(|| {
                    invalid_value(path, raw, format!("expected one of {}", symbols.join(", ")))
                }),
        }
    }

    /// Coerces a value for ordering comparisons, which are only defined on
    /// signed 8, 32 and 64 bit integer fields.
    pub fn coerce_integer(&self, path: &str, raw: &str) -> Result<Value> {
        let parsed = match self {
            FieldKind::Int8 => raw.parse::<i8>().map(Value::Int8),
            FieldKind::Int32 => raw.parse::<i32>().map(Value::Int32),
            FieldKind::Int64 => raw.parse::<i64>().map(Value::Int64),
            other => {
                return Err(invalid_value(
                    path,
                    raw,
                    format!("numeric comparison on a {:?} field", other),
                ));
            }
        };
        parsed.map_err(|e| invalid_value(path, raw, e.to_string()))
    }

    /// Anything but a case-insensitive "true" is false.
    pub fn coerce_bool(raw: &str) -> Value {
        Value::Bool(raw.eq_ignore_ascii_case("true"))
    }

    /// Turns `*` into the SQL wildcard. `%` and `_` in the input keep their
    /// SQL meaning; there is no escape. Case folding is left to the
    /// comparison, see [`crate::query::Restriction::like_ignore_case`].
    pub fn coerce_pattern(raw: &str) -> String {
        raw.replace('*', "%")
    }
}

fn invalid_value(path: &str, raw: &str, reason: String) -> SiftError {
    SiftError::InvalidValue {
        path: path.to_string(),
        value: raw.to_string(),
        reason,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    path: &'static str,
    column: &'static str,
    kind: FieldKind,
}

impl FieldDef {
    pub fn path(&self) -> &'static str {
        self.path
    }
    pub fn column(&self) -> &'static str {
        self.column
    }
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    name: &'static str,
    table: &'static str,
    fields: Vec<FieldDef>,
    by_path: HashMap<&'static str, usize, FieldHasher>,
}

impl EntitySchema {
    /// `name` doubles as the default query alias.
    pub fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            fields: Vec::new(),
            by_path: HashMap::default(),
        }
    }

    /// Registers a field. Registering the same path twice is a programming error.
    pub fn field(mut self, path: &'static str, column: &'static str, kind: FieldKind) -> Self {
        assert!(
            !self.by_path.contains_key(path),
            "field '{}' registered twice on {}",
            path,
            self.name
        );
        self.by_path.insert(path, self.fields.len());
        self.fields.push(FieldDef { path, column, kind });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Resolves a field path, accepting it bare or prefixed with `alias.`.
    pub fn resolve(&self, alias: &str, path: &str) -> Option<&FieldDef> {
        if let Some(index) = self.by_path.get(path) {
            return Some(&self.fields[*index]);
        }
        path.strip_prefix(alias)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|bare| self.by_path.get(bare))
            .map(|index| &self.fields[*index])
    }

    /// Distinct columns in registration order, as selected when materialising rows.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if !columns.contains(&field.column) {
                columns.push(field.column);
            }
        }
        columns
    }
}

/// An entity type that can be searched.
pub trait Entity: Sized {
    fn schema() -> &'static EntitySchema;
}
