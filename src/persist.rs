// used for persistence
use std::cell::Cell;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSql, ValueRef};
use rusqlite::{Connection, Row};

// used to log the statements we run
use tracing::debug;

// our own stuff that we need
use crate::error::{Result, SiftError};
use crate::executor::QueryExecutor;
use crate::query::{Comparison, Query};
use crate::schema::Entity;

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

impl PersistenceMode {
    /// `":memory:"` (or nothing) means in-memory, anything else is a file path.
    pub fn from_setting(database: Option<&str>) -> Self {
        match database {
            None | Some(":memory:") | Some("") => Self::InMemory,
            Some(path) => Self::File(path.to_string()),
        }
    }

    pub fn open(&self) -> Result<Connection> {
        let connection = match self {
            Self::InMemory => Connection::open_in_memory()?,
            Self::File(path) => Connection::open(path)?,
        };
        Ok(connection)
    }
}

/// An entity that can be read back from a row selected by the [`Persistor`].
///
/// Rows carry every column of the entity schema, named after the column.
pub trait SqliteEntity: Entity {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// SQL function upper-casing text with Rust's Unicode case mapping, the same
/// mapping applied to like patterns. SQLite's own `upper()` only folds ASCII.
pub const UPPER_FUNCTION: &str = "rowsift_upper";

/// Registers [`UPPER_FUNCTION`] on `db`. Registering it again replaces it.
pub fn register_functions(db: &Connection) -> Result<()> {
    db.create_scalar_function(
        UPPER_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            Ok(match ctx.get_raw(0) {
                ValueRef::Text(text) => Some(String::from_utf8_lossy(text).to_uppercase()),
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(r) => Some(r.to_string()),
                ValueRef::Null | ValueRef::Blob(_) => None,
            })
        },
    )?;
    Ok(())
}

// ------------- Persistence -------------
pub struct Persistor<'db> {
    db: &'db Connection,
    // set once the SQL functions are on the connection
    registered: Cell<bool>,
}

impl<'db> Persistor<'db> {
    pub fn new(connection: &'db Connection) -> Persistor<'db> {
        Persistor {
            db: connection,
            registered: Cell::new(false),
        }
    }

    fn ensure_functions(&self) -> Result<()> {
        if !self.registered.get() {
            register_functions(self.db)?;
            self.registered.set(true);
        }
        Ok(())
    }

    fn materialize<T: SqliteEntity>(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<T>> {
        debug!(%sql, params = params.len(), "fetching rows");
        self.ensure_functions()?;
        let mut statement = self.db.prepare_cached(sql)?;
        let rows = statement.query_map(params, |row| T::from_row(row))?;
        let mut entities = Vec::new();
        for entity in rows {
            entities.push(entity?);
        }
        Ok(entities)
    }
}

impl<T: SqliteEntity> QueryExecutor<T> for Persistor<'_> {
    fn result_list(&self, query: &Query) -> Result<Vec<T>> {
        let mut sql = select_clause(query);
        let params = where_clause(query, &mut sql);
        order_clause(query, &mut sql);
        self.materialize(&sql, &params)
    }

    fn window(&self, query: &Query, offset: usize, limit: usize) -> Result<Vec<T>> {
        let limit = i64::try_from(limit).map_err(|e| SiftError::Invariant(e.to_string()))?;
        let offset = i64::try_from(offset).map_err(|e| SiftError::Invariant(e.to_string()))?;
        let mut sql = select_clause(query);
        let mut params: Vec<&dyn ToSql> = where_clause(query, &mut sql);
        order_clause(query, &mut sql);
        sql.push_str(" limit ? offset ?");
        params.push(&limit);
        params.push(&offset);
        self.materialize(&sql, &params)
    }

    fn count(&self, query: &Query) -> Result<usize> {
        let mut sql = format!(
            "select count(*) from \"{}\" {}",
            query.schema().table(),
            query.alias()
        );
        let params = where_clause(query, &mut sql);
        debug!(%sql, params = params.len(), "counting rows");
        self.ensure_functions()?;
        let mut statement = self.db.prepare_cached(&sql)?;
        let total: i64 = statement.query_row(params.as_slice(), |r| r.get(0))?;
        usize::try_from(total).map_err(|e| SiftError::Invariant(e.to_string()))
    }
}

fn column_ref(query: &Query, column: &str) -> String {
    format!("{}.\"{}\"", query.alias(), column)
}

fn select_clause(query: &Query) -> String {
    let columns: Vec<String> = query
        .schema()
        .columns()
        .iter()
        .map(|column| format!("{} as \"{}\"", column_ref(query, column), column))
        .collect();
    format!(
        "select {} from \"{}\" {}",
        columns.join(", "),
        query.schema().table(),
        query.alias()
    )
}

/// Appends the where clause and returns the values to bind, in placeholder order.
fn where_clause<'q>(query: &'q Query, sql: &mut String) -> Vec<&'q dyn ToSql> {
    let mut params: Vec<&'q dyn ToSql> = Vec::new();
    let mut conditions: Vec<String> = Vec::with_capacity(query.predicates().len());
    for predicate in query.predicates() {
        let column = column_ref(query, predicate.field().column());
        let condition = match predicate.comparison() {
            Comparison::Eq => format!("{} = ?", column),
            Comparison::NotEq => format!("{} <> ?", column),
            Comparison::Gt => format!("{} > ?", column),
            Comparison::Ge => format!("{} >= ?", column),
            Comparison::Lt => format!("{} < ?", column),
            Comparison::Le => format!("{} <= ?", column),
            // no escape clause: '%' and '_' in the pattern stay wildcards
            Comparison::LikeIgnoreCase => format!("{}({}) like ?", UPPER_FUNCTION, column),
            Comparison::In if predicate.values().is_empty() => String::from("1 = 0"),
            Comparison::In => {
                let placeholders = vec!["?"; predicate.values().len()].join(", ");
                format!("{} in ({})", column, placeholders)
            }
        };
        conditions.push(condition);
        for value in predicate.values() {
            params.push(value);
        }
    }
    if !conditions.is_empty() {
        sql.push_str(" where ");
        sql.push_str(&conditions.join(" and "));
    }
    params
}

fn order_clause(query: &Query, sql: &mut String) {
    let clauses: Vec<String> = query
        .order_clauses()
        .iter()
        .map(|clause| {
            let direction = if clause.ascending() { "asc" } else { "desc" };
            format!("{} {}", column_ref(query, clause.field().column()), direction)
        })
        .collect();
    if !clauses.is_empty() {
        sql.push_str(" order by ");
        sql.push_str(&clauses.join(", "));
    }
}
