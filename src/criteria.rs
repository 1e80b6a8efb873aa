//! Caller-supplied search descriptions and the results handed back.
//!
//! The serde representation matches the JSON the surrounding storage layer
//! exchanges with its clients: filters carry `name`, `operator` and `value`,
//! ordering is `orderBy`, paging is `{ "page", "pageSize" }` and results are
//! `{ "totalSize", "beans" }`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    BoolEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Neq,
    Like,
}

/// One `(field, operator, value)` constraint. The value stays a string until
/// it is coerced against the declared kind of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    #[serde(rename = "name")]
    pub field_path: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterDescriptor {
    pub fn new(field_path: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderDescriptor {
    #[serde(rename = "name")]
    pub field_path: String,
    pub ascending: bool,
}

impl OrderDescriptor {
    pub fn new(field_path: impl Into<String>, ascending: bool) -> Self {
        Self {
            field_path: field_path.into(),
            ascending,
        }
    }
    pub fn asc(field_path: impl Into<String>) -> Self {
        Self::new(field_path, true)
    }
    pub fn desc(field_path: impl Into<String>) -> Self {
        Self::new(field_path, false)
    }
}

/// 1-indexed page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingDescriptor {
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl PagingDescriptor {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page < 1 || self.page_size < 1 {
            return Err(SiftError::Invariant(format!(
                "paging needs page >= 1 and page size >= 1, got page {} of size {}",
                self.page, self.page_size
            )));
        }
        Ok(())
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }
}

impl Default for PagingDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub filters: Vec<FilterDescriptor>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingDescriptor>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field_path: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        self.filters.push(FilterDescriptor::new(field_path, operator, value));
        self
    }

    pub fn order_by(mut self, field_path: impl Into<String>, ascending: bool) -> Self {
        self.order_by = Some(OrderDescriptor::new(field_path, ascending));
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.paging = Some(PagingDescriptor::new(page, page_size));
        self
    }

    /// The requested paging, or `fallback` when the caller sent none.
    pub fn paging_or(&self, fallback: PagingDescriptor) -> PagingDescriptor {
        self.paging.unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    #[serde(rename = "totalSize")]
    pub total_size: usize,
    #[serde(rename = "beans")]
    pub items: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn new(total_size: usize, items: Vec<T>) -> Self {
        Self { total_size, items }
    }
}
