//! Backend-neutral query description.
//!
//! A [`Query`] names an entity schema under an alias and accumulates typed
//! predicates and order clauses. Field paths are resolved against the schema
//! when they are added, so an executor only ever sees known columns and
//! coerced [`Value`]s. Rendering and execution belong to the executor (see
//! [`crate::persist`]).

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, SiftError};
use crate::schema::{Entity, EntitySchema, FieldDef};
use crate::value::Value;

lazy_static! {
    static ref ALIAS: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    /// Case-insensitive `like` without an escape character.
    LikeIgnoreCase,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: &'static FieldDef,
    comparison: Comparison,
    values: Vec<Value>,
}

impl Predicate {
    pub fn field(&self) -> &'static FieldDef {
        self.field
    }
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }
    /// Exactly one value, except for `In` which holds the whole list.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    field: &'static FieldDef,
    ascending: bool,
}

impl OrderClause {
    pub fn field(&self) -> &'static FieldDef {
        self.field
    }
    pub fn ascending(&self) -> bool {
        self.ascending
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    schema: &'static EntitySchema,
    alias: String,
    predicates: Vec<Predicate>,
    order: Vec<OrderClause>,
}

impl Query {
    /// Starts a query over `schema`. The alias ends up in SQL text, so only
    /// plain identifiers are accepted.
    pub fn from(schema: &'static EntitySchema, alias: &str) -> Result<Self> {
        if !ALIAS.is_match(alias) {
            return Err(SiftError::InvalidAlias(alias.to_string()));
        }
        Ok(Self {
            schema,
            alias: alias.to_string(),
            predicates: Vec::new(),
            order: Vec::new(),
        })
    }

    /// Starts a query over an entity type, aliased by its schema name.
    pub fn of<T: Entity>() -> Result<Self> {
        Self::from(T::schema(), T::schema().name())
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }
    pub fn alias(&self) -> &str {
        &self.alias
    }
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
    pub fn order_clauses(&self) -> &[OrderClause] {
        &self.order
    }

    pub fn field(&self, path: &str) -> Result<&'static FieldDef> {
        self.schema
            .resolve(&self.alias, path)
            .ok_or_else(|| SiftError::InvalidFilter {
                entity: self.schema.name(),
                path: path.to_string(),
            })
    }

    /// Begins a restriction on `path`; finish it with one of the comparison methods.
    pub fn where_path(&mut self, path: &str) -> Result<Restriction<'_>> {
        let field = self.field(path)?;
        Ok(Restriction { query: self, field })
    }

    pub fn order_by(&mut self, path: &str, ascending: bool) -> Result<&mut Self> {
        let field = self
            .schema
            .resolve(&self.alias, path)
            .ok_or_else(|| SiftError::InvalidOrder {
                entity: self.schema.name(),
                path: path.to_string(),
            })?;
        self.order.push(OrderClause { field, ascending });
        Ok(self)
    }

    pub fn order_by_asc(&mut self, path: &str) -> Result<&mut Self> {
        self.order_by(path, true)
    }

    pub fn order_by_desc(&mut self, path: &str) -> Result<&mut Self> {
        self.order_by(path, false)
    }
}

/// A pending predicate on one resolved field.
pub struct Restriction<'q> {
    query: &'q mut Query,
    field: &'static FieldDef,
}

impl<'q> Restriction<'q> {
    fn push(self, comparison: Comparison, values: Vec<Value>) -> &'q mut Query {
        self.query.predicates.push(Predicate {
            field: self.field,
            comparison,
            values,
        });
        self.query
    }

    pub fn eq(self, value: impl Into<Value>) -> &'q mut Query {
        self.push(Comparison::Eq, vec![value.into()])
    }
    pub fn not_eq(self, value: impl Into<Value>) -> &'q mut Query {
        self.push(Comparison::NotEq, vec![value.into()])
    }
    pub fn gt(self, value: impl Into<Value>) -> &'q mut Query {
        self.push(Comparison::Gt, vec![value.into()])
    }
    pub fn ge(self, value: impl Into<Value>) -> &'q mut Query {
        self.push(Comparison::Ge, vec![value.into()])
    }
    pub fn lt(self, value: impl Into<Value>) -> &'q mut Query {
        self.push(Comparison::Lt, vec![value.into()])
    }
    pub fn le(self, value: impl Into<Value>) -> &'q mut Query {
        self.push(Comparison::Le, vec![value.into()])
    }

    /// Matches the upper-cased column against the upper-cased pattern. Both
    /// sides use full Unicode case mapping, see [`crate::persist::UPPER_FUNCTION`].
    pub fn like_ignore_case(self, pattern: &str) -> &'q mut Query {
        self.push(Comparison::LikeIgnoreCase, vec![Value::Text(pattern.to_uppercase())])
    }

    /// Membership in a list; an empty list matches nothing.
    pub fn in_list<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> &'q mut Query {
        let values = values.into_iter().map(Into::into).collect();
        self.push(Comparison::In, values)
    }
}
