//! Memory-bounded traversal of a whole result set.
//!
//! [`BatchIterator`] holds at most one page of [`BATCH_SIZE`] rows. When the
//! last row of a page is handed out the next page is fetched straight away,
//! unless the page just consumed was short, in which case the source is known
//! to be drained and no further query runs.
//!
//! Exhaustion is inferred from a short page. If rows are deleted between two
//! fetches of a result set whose size is a multiple of the page size, later
//! rows shift into already visited offsets and are never seen.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use tracing::{debug, error};

use crate::error::{Result, SiftError};
use crate::executor::QueryExecutor;
use crate::query::Query;

pub const BATCH_SIZE: usize = 100;

pub struct BatchIterator<'e, T, E> {
    executor: &'e E,
    query: Query,
    // row offset of the next page
    offset: usize,
    batch: VecDeque<T>,
    last_fetched: Option<usize>,
    failure: Option<SiftError>,
}

impl<'e, T, E: QueryExecutor<T>> BatchIterator<'e, T, E> {
    /// Fetches the first page of `query`.
    pub fn new(executor: &'e E, query: Query) -> Result<Self> {
        let mut iterator = Self {
            executor,
            query,
            offset: 0,
            batch: VecDeque::new(),
            last_fetched: None,
            failure: None,
        };
        iterator.fetch()?;
        Ok(iterator)
    }

    fn fetch(&mut self) -> Result<()> {
        if self.last_fetched.is_some_and(|fetched| fetched < BATCH_SIZE) {
            self.batch.clear();
        } else {
            let rows = self
                .executor
                .window(&self.query, self.offset, BATCH_SIZE)
                .map_err(|e| {
                    error!(entity = self.query.schema().name(), offset = self.offset, error = %e, "batch fetch failed");
                    e.into_storage()
                })?;
            debug!(entity = self.query.schema().name(), offset = self.offset, rows = rows.len(), "fetched batch");
            self.last_fetched = Some(rows.len());
            self.batch = rows.into();
        }
        self.offset += BATCH_SIZE;
        Ok(())
    }

    /// True while the current page still has an unconsumed row, or a failed
    /// fetch is waiting to be reported.
    pub fn has_next(&self) -> bool {
        !self.batch.is_empty() || self.failure.is_some()
    }

    pub fn remove(&mut self) -> Result<()> {
        Err(SiftError::UnsupportedOperation("removal during batch iteration"))
    }
}

impl<T, E: QueryExecutor<T>> Iterator for BatchIterator<'_, T, E> {
    type Item = Result<T>;

    /// A fetch that fails after the last row of a page was taken is reported
    /// by the following call; the iterator ends after that.
    fn next(&mut self) -> Option<Result<T>> {
        if let Some(failure) = self.failure.take() {
            return Some(Err(failure));
        }
        let item = self.batch.pop_front()?;
        if self.batch.is_empty() {
            if let Err(e) = self.fetch() {
                self.failure = Some(e);
            }
        }
        Some(Ok(item))
    }
}

impl<T, E: QueryExecutor<T>> FusedIterator for BatchIterator<'_, T, E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntitySchema, FieldKind};
    use lazy_static::lazy_static;
    use std::cell::RefCell;

    lazy_static! {
        static ref NUMBER: EntitySchema = EntitySchema::new("Number", "number").field("n", "n", FieldKind::Int64);
    }

    /// Serves windows of `0..rows`, recording each fetch, failing the nth if asked.
    struct Numbers {
        rows: usize,
        fail_on: Option<usize>,
        fetches: RefCell<Vec<(usize, usize)>>,
    }

    impl Numbers {
        fn new(rows: usize) -> Self {
            Self { rows, fail_on: None, fetches: RefCell::new(Vec::new()) }
        }
    }

    impl QueryExecutor<usize> for Numbers {
        fn result_list(&self, _: &Query) -> Result<Vec<usize>> {
            Ok((0..self.rows).collect())
        }
        fn window(&self, _: &Query, offset: usize, limit: usize) -> Result<Vec<usize>> {
            let mut fetches = self.fetches.borrow_mut();
            fetches.push((offset, limit));
            if self.fail_on == Some(fetches.len()) {
                return Err(SiftError::Persistence("connection reset".into()));
            }
            Ok((offset..self.rows.min(offset + limit)).collect())
        }
        fn count(&self, _: &Query) -> Result<usize> {
            Ok(self.rows)
        }
    }

    fn query() -> Query {
        Query::from(&NUMBER, "n").unwrap()
    }

    #[test]
    fn partial_last_page_stops_fetching() {
        let source = Numbers::new(250);
        let mut iterator = BatchIterator::new(&source, query()).unwrap();
        let mut seen = Vec::new();
        while iterator.has_next() {
            seen.push(iterator.next().unwrap().unwrap());
        }
        assert_eq!(seen, (0..250).collect::<Vec<_>>());
        assert!(iterator.next().is_none());
        assert_eq!(*source.fetches.borrow(), vec![(0, 100), (100, 100), (200, 100)]);
    }

    #[test]
    fn exact_multiple_needs_one_empty_fetch() {
        let source = Numbers::new(200);
        let count = BatchIterator::new(&source, query()).unwrap().map(|n| n.unwrap()).count();
        assert_eq!(count, 200);
        assert_eq!(source.fetches.borrow().len(), 3);
    }

    #[test]
    fn empty_source_has_nothing() {
        let source = Numbers::new(0);
        let mut iterator = BatchIterator::new(&source, query()).unwrap();
        assert!(!iterator.has_next());
        assert!(iterator.next().is_none());
        assert_eq!(source.fetches.borrow().len(), 1);
    }

    #[test]
    fn failed_prefetch_is_reported_after_the_last_item() {
        let source = Numbers { fail_on: Some(2), ..Numbers::new(150) };
        let mut iterator = BatchIterator::new(&source, query()).unwrap();
        for expected in 0..100 {
            assert_eq!(iterator.next().unwrap().unwrap(), expected);
        }
        assert!(iterator.has_next());
        let err = iterator.next().unwrap().unwrap_err();
        assert!(matches!(err.cause(), SiftError::Persistence(_)));
        assert!(matches!(err, SiftError::Storage(_)));
        assert!(iterator.next().is_none());
    }

    #[test]
    fn removal_is_unsupported() {
        let source = Numbers::new(3);
        let mut iterator = BatchIterator::new(&source, query()).unwrap();
        assert!(matches!(iterator.remove(), Err(SiftError::UnsupportedOperation(_))));
        assert_eq!(iterator.count(), 3);
    }
}
