//! The execution capability the search core consumes.
//!
//! Executors turn a [`Query`] into materialised entities. They own the SQL
//! dialect and the connection; the core only decides which query to run and
//! which window of it to fetch.

use crate::error::Result;
use crate::query::Query;

/// A page of results together with the number of rows across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedList<T> {
    items: Vec<T>,
    total_size: usize,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, total_size: usize) -> Self {
        Self { items, total_size }
    }
    pub fn total_size(&self) -> usize {
        self.total_size
    }
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

pub trait QueryExecutor<T> {
    /// Every row the query matches, in query order.
    fn result_list(&self, query: &Query) -> Result<Vec<T>>;

    /// At most `limit` rows starting at the zero-based row `offset`.
    fn window(&self, query: &Query, offset: usize, limit: usize) -> Result<Vec<T>>;

    /// Number of rows the query matches, ignoring its order clauses.
    fn count(&self, query: &Query) -> Result<usize>;

    /// A window plus the total match count. Skips the window query when the
    /// offset already lies past the last row.
    fn paged_result_list(&self, query: &Query, offset: usize, limit: usize) -> Result<PagedList<T>> {
        let total_size = self.count(query)?;
        let items = if offset >= total_size {
            Vec::new()
        } else {
            self.window(query, offset, limit)?
        };
        Ok(PagedList::new(items, total_size))
    }
}

impl<T, E: QueryExecutor<T> + ?Sized> QueryExecutor<T> for &E {
    fn result_list(&self, query: &Query) -> Result<Vec<T>> {
        (**self).result_list(query)
    }
    fn window(&self, query: &Query, offset: usize, limit: usize) -> Result<Vec<T>> {
        (**self).window(query, offset, limit)
    }
    fn count(&self, query: &Query) -> Result<usize> {
        (**self).count(query)
    }
    fn paged_result_list(&self, query: &Query, offset: usize, limit: usize) -> Result<PagedList<T>> {
        (**self).paged_result_list(query, offset, limit)
    }
}
