#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Row, params};

use rowsift::executor::QueryExecutor;
use rowsift::persist::{Persistor, SqliteEntity};
use rowsift::query::Query;
use rowsift::schema::{Entity, EntitySchema, FieldKind};
use rowsift::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Retired,
}

impl Status {
    pub const SYMBOLS: &'static [&'static str] = &["ACTIVE", "RETIRED"];

    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::Retired => "RETIRED",
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.symbol()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "ACTIVE" => Ok(Status::Active),
            "RETIRED" => Ok(Status::Retired),
            other => Err(FromSqlError::Other(format!("unknown status {other}").into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub id: i64,
    pub name: String,
    pub status: Status,
    pub age: i32,
    pub rank: i8,
    pub enabled: bool,
    pub organization_id: String,
    pub created_on: DateTime<Utc>,
}

lazy_static! {
    static ref WIDGET: EntitySchema = EntitySchema::new("Widget", "widget")
        .field("id", "id", FieldKind::Int64)
        .field("name", "name", FieldKind::Text)
        .field("status", "status", FieldKind::Enumeration(Status::SYMBOLS))
        .field("age", "age", FieldKind::Int32)
        .field("rank", "rank", FieldKind::Int8)
        .field("enabled", "enabled", FieldKind::Bool)
        .field("organization.id", "organization_id", FieldKind::Text)
        .field("createdOn", "created_on", FieldKind::Timestamp);
}

impl Entity for Widget {
    fn schema() -> &'static EntitySchema {
        &WIDGET
    }
}

impl SqliteEntity for Widget {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Widget {
            id: row.get("id")?,
            name: row.get("name")?,
            status: row.get("status")?,
            age: row.get("age")?,
            rank: row.get("rank")?,
            enabled: row.get("enabled")?,
            organization_id: row.get("organization_id")?,
            created_on: row.get("created_on")?,
        })
    }
}

impl Widget {
    pub fn new(id: i64, name: &str) -> Self {
        Widget {
            id,
            name: name.to_string(),
            status: Status::Active,
            age: 30,
            rank: 1,
            enabled: true,
            organization_id: "acme".to_string(),
            created_on: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
    pub fn age(mut self, age: i32) -> Self {
        self.age = age;
        self
    }
    pub fn rank(mut self, rank: i8) -> Self {
        self.rank = rank;
        self
    }
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn organization(mut self, organization_id: &str) -> Self {
        self.organization_id = organization_id.to_string();
        self
    }
    pub fn created_on(mut self, created_on: DateTime<Utc>) -> Self {
        self.created_on = created_on;
        self
    }
}

pub fn connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "
        create table widget (
            id integer not null primary key,
            name text not null,
            status text not null,
            age integer not null,
            rank integer not null,
            enabled integer not null,
            organization_id text not null,
            created_on text not null
        );
        ",
    )
    .unwrap();
    conn
}

pub fn insert(conn: &Connection, widgets: &[Widget]) {
    let mut statement = conn
        .prepare("insert into widget values (?, ?, ?, ?, ?, ?, ?, ?)")
        .unwrap();
    for w in widgets {
        statement
            .execute(params![
                w.id,
                w.name,
                w.status,
                w.age,
                w.rank,
                w.enabled,
                w.organization_id,
                w.created_on
            ])
            .unwrap();
    }
}

/// `count` widgets with ids 1..=count and names in reverse id order, so that
/// ordering by name and by id disagree.
pub fn seeded(count: i64) -> Connection {
    let conn = connection();
    let widgets: Vec<Widget> = (1..=count)
        .map(|id| {
            Widget::new(id, &format!("widget-{:04}", count + 1 - id))
                .age((id % 50) as i32)
                .status(if id % 3 == 0 { Status::Retired } else { Status::Active })
                .organization(if id % 2 == 0 { "acme" } else { "globex" })
        })
        .collect();
    insert(&conn, &widgets);
    conn
}

pub fn ids(widgets: &[Widget]) -> Vec<i64> {
    widgets.iter().map(|w| w.id).collect()
}

/// Delegates to a [`Persistor`], counting each kind of query and keeping the
/// order clauses of the last one.
pub struct Recording<'db> {
    inner: Persistor<'db>,
    pub windows: Cell<usize>,
    pub counts: Cell<usize>,
    pub lists: Cell<usize>,
    pub last_order: RefCell<Vec<(&'static str, bool)>>,
}

impl<'db> Recording<'db> {
    pub fn new(conn: &'db Connection) -> Self {
        Recording {
            inner: Persistor::new(conn),
            windows: Cell::new(0),
            counts: Cell::new(0),
            lists: Cell::new(0),
            last_order: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, query: &Query) {
        *self.last_order.borrow_mut() = query
            .order_clauses()
            .iter()
            .map(|clause| (clause.field().path(), clause.ascending()))
            .collect();
    }
}

impl<T: SqliteEntity> QueryExecutor<T> for Recording<'_> {
    fn result_list(&self, query: &Query) -> Result<Vec<T>> {
        self.lists.set(self.lists.get() + 1);
        self.record(query);
        QueryExecutor::<T>::result_list(&self.inner, query)
    }
    fn window(&self, query: &Query, offset: usize, limit: usize) -> Result<Vec<T>> {
        self.windows.set(self.windows.get() + 1);
        self.record(query);
        QueryExecutor::<T>::window(&self.inner, query, offset, limit)
    }
    fn count(&self, query: &Query) -> Result<usize> {
        self.counts.set(self.counts.get() + 1);
        QueryExecutor::<T>::count(&self.inner, query)
    }
}
