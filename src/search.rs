//! Criteria-driven search over any entity an executor can materialise.
//!
//! A search runs in a fixed order: filters from the criteria, then the
//! caller's extra constraints, then ordering, then execution. Every fault on
//! the way is logged here and handed back as [`SiftError::Storage`], so
//! callers see one error kind regardless of where the search failed. The
//! original fault stays reachable through [`SiftError::cause`].

use tracing::{error, info};

use crate::criteria::{OrderDescriptor, PagingDescriptor, SearchCriteria, SearchResult};
use crate::error::{Result, SiftError};
use crate::executor::QueryExecutor;
use crate::iterate::BatchIterator;
use crate::order::compose;
use crate::query::Query;
use crate::schema::Entity;
use crate::settings::Settings;
use crate::translate::translate;

pub struct SearchStorage<E> {
    executor: E,
    default_paging: PagingDescriptor,
}

impl<E> SearchStorage<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            default_paging: PagingDescriptor::default(),
        }
    }

    /// Takes the default page size from the settings.
    pub fn with_settings(executor: E, settings: &Settings) -> Self {
        Self {
            executor,
            default_paging: PagingDescriptor::new(1, settings.default_page_size),
        }
    }

    /// Paging used when the criteria carry none.
    pub fn default_paging(&self) -> PagingDescriptor {
        self.default_paging
    }

    /// Searches `T` under its schema name as alias.
    ///
    /// `unique_keys` must form a unique tuple over the rows of `T`. With
    /// `paginate` the requested page is returned and `total_size` counts all
    /// matching rows; without it every match is returned, ordered by the
    /// unique keys only, and `total_size` is the number of items returned.
    pub fn search<T>(
        &self,
        criteria: &SearchCriteria,
        unique_keys: &[OrderDescriptor],
        paginate: bool,
    ) -> Result<SearchResult<T>>
    where
        T: Entity,
        E: QueryExecutor<T>,
    {
        self.search_with(criteria, unique_keys, T::schema().name(), |_| Ok(()), paginate)
    }

    /// Like [`search`](Self::search), under an explicit alias and with
    /// `extra_constraints` applied after the filters, e.g. to scope the search
    /// to what the caller may see.
    pub fn search_with<T, F>(
        &self,
        criteria: &SearchCriteria,
        unique_keys: &[OrderDescriptor],
        alias: &str,
        extra_constraints: F,
        paginate: bool,
    ) -> Result<SearchResult<T>>
    where
        T: Entity,
        E: QueryExecutor<T>,
        F: FnOnce(&mut Query) -> Result<()>,
    {
        let entity = T::schema().name();
        match self.run_search(criteria, unique_keys, alias, extra_constraints, paginate) {
            Ok(result) => {
                info!(entity, paginate, total = result.total_size, returned = result.items.len(), "search complete");
                Ok(result)
            }
            Err(e) => {
                error!(entity, paginate, error = %e, cause = ?e.cause(), "search failed");
                Err(e.into_storage())
            }
        }
    }

    fn run_search<T, F>(
        &self,
        criteria: &SearchCriteria,
        unique_keys: &[OrderDescriptor],
        alias: &str,
        extra_constraints: F,
        paginate: bool,
    ) -> Result<SearchResult<T>>
    where
        T: Entity,
        E: QueryExecutor<T>,
        F: FnOnce(&mut Query) -> Result<()>,
    {
        let mut query = translate(T::schema(), alias, &criteria.filters)?;
        extra_constraints(&mut query)?;
        if paginate {
            let paging = criteria.paging_or(self.default_paging);
            paging.validate()?;
            if unique_keys.is_empty() {
                return Err(SiftError::Invariant(format!(
                    "paginating {} needs at least one unique order key",
                    T::schema().name()
                )));
            }
            compose(alias, criteria.order_by.as_ref(), unique_keys, &mut query, true)?;
            let page = self
                .executor
                .paged_result_list(&query, paging.offset(), paging.limit())?;
            Ok(SearchResult::new(page.total_size(), page.into_items()))
        } else {
            // unique keys only; the requested order is not applied here
            compose(alias, criteria.order_by.as_ref(), unique_keys, &mut query, false)?;
            let items = self.executor.result_list(&query)?;
            Ok(SearchResult::new(items.len(), items))
        }
    }

    /// Number of rows matching the filters of `criteria`. Ordering and paging
    /// are ignored.
    pub fn count<T>(&self, criteria: &SearchCriteria) -> Result<usize>
    where
        T: Entity,
        E: QueryExecutor<T>,
    {
        let entity = T::schema().name();
        translate(T::schema(), entity, &criteria.filters)
            .and_then(|query| self.executor.count(&query))
            .map_err(|e| {
                error!(entity, error = %e, "count failed");
                e.into_storage()
            })
    }

    /// Walks every row of `query` in batches of [`crate::iterate::BATCH_SIZE`].
    /// The first batch is fetched before this returns.
    pub fn iterate<T>(&self, query: Query) -> Result<BatchIterator<'_, T, E>>
    where
        E: QueryExecutor<T>,
    {
        BatchIterator::new(&self.executor, query)
    }

    /// The single row `query` matches, if any. More than one is an error.
    pub fn find_one<T>(&self, query: &Query) -> Result<Option<T>>
    where
        E: QueryExecutor<T>,
    {
        let mut rows = self.executor.window(query, 0, 2)?;
        if rows.len() > 1 {
            return Err(SiftError::Invariant(format!(
                "more than one {} matches the query",
                query.schema().name()
            )));
        }
        Ok(rows.pop())
    }
}
