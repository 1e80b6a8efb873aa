//! Rowsift – criteria-driven search, stable pagination and batched iteration
//! over typed entities stored in a relational backend.
//!
//! Callers describe *what* they want as a [`criteria::SearchCriteria`]: a list
//! of `(field, operator, value)` filters with untyped string values, an
//! optional order and an optional page. Rowsift turns that into a typed
//! [`query::Query`] against the entity's schema, adds the ordering needed for
//! stable pages and hands it to an executor.
//!
//! ## Modules
//! * [`schema`] – Per-entity field registries ([`schema::EntitySchema`]) and the
//!   [`schema::FieldKind`] coercions applied to filter values.
//! * [`criteria`] – Filter, order and paging descriptors plus [`criteria::SearchResult`].
//! * [`query`] – The backend-neutral query builder.
//! * [`translate`] – Filter descriptors to typed predicates.
//! * [`order`] – Requested order merged with unique tie-break keys.
//! * [`search`] – [`search::SearchStorage`], the paginated and unpaginated search entry points.
//! * [`iterate`] – [`iterate::BatchIterator`], page-by-page traversal of a whole result set.
//! * [`executor`] – The [`executor::QueryExecutor`] capability the core runs queries through.
//! * [`persist`] – The SQLite executor, [`persist::Persistor`].
//! * [`settings`] – Layered settings and `tracing` setup.
//!
//! ## Pagination
//! Offset pagination is only stable when the final order is a total order over
//! the rows. Every paginated search therefore appends the entity's *unique
//! order keys* (typically its primary key) after the caller's requested order,
//! skipping a key that repeats the requested field. The paginated path reports
//! the number of matches across all pages; the unpaginated path returns every
//! match, ordered by the unique keys only, and reports how many it returned.
//!
//! ## Quick Start
//! ```
//! use lazy_static::lazy_static;
//! use rusqlite::{Connection, Row};
//! use rowsift::criteria::{FilterOperator, OrderDescriptor, SearchCriteria};
//! use rowsift::persist::{Persistor, SqliteEntity};
//! use rowsift::schema::{Entity, EntitySchema, FieldKind};
//! use rowsift::search::SearchStorage;
//!
//! struct Planet { id: i64, name: String }
//!
//! lazy_static! {
//!     static ref PLANET: EntitySchema = EntitySchema::new("Planet", "planet")
//!         .field("id", "id", FieldKind::Int64)
//!         .field("name", "name", FieldKind::Text);
//! }
//! impl Entity for Planet {
//!     fn schema() -> &'static EntitySchema { &PLANET }
//! }
//! impl SqliteEntity for Planet {
//!     fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
//!         Ok(Planet { id: row.get("id")?, name: row.get("name")? })
//!     }
//! }
//!
//! let conn = Connection::open_in_memory().unwrap();
//! conn.execute_batch("
//!     create table planet (id integer primary key, name text not null);
//!     insert into planet values (1, 'Mercury'), (2, 'Mars'), (3, 'Earth');
//! ").unwrap();
//! let storage = SearchStorage::new(Persistor::new(&conn));
//! let criteria = SearchCriteria::new()
//!     .filter("name", FilterOperator::Like, "m*")
//!     .page(1, 1);
//! let found = storage.search::<Planet>(&criteria, &[OrderDescriptor::asc("id")], true).unwrap();
//! assert_eq!(found.total_size, 2);
//! assert_eq!(found.items[0].name, "Mercury");
//! ```
//!
//! ## Errors
//! Translation fails with [`SiftError::InvalidFilter`] for unknown fields and
//! [`SiftError::InvalidValue`] for values that do not coerce. Searches wrap
//! every fault in [`SiftError::Storage`]; [`SiftError::cause`] digs out the
//! original one.

pub mod criteria;
pub mod error;
pub mod executor;
pub mod iterate;
pub mod order;
pub mod persist;
pub mod query;
pub mod schema;
pub mod search;
pub mod settings;
pub mod translate;
pub mod value;

pub use error::{Result, SiftError};
