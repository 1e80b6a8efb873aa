//! Composition of requested ordering with unique tie-break keys.
//!
//! Offset pagination is only stable when the final order forms a unique tuple
//! over the rows, so the caller's order is always followed by the entity's
//! unique keys. A unique key naming the requested field is skipped, since
//! some SQL dialects reject a column that appears twice in an order by.

use crate::criteria::OrderDescriptor;
use crate::error::Result;
use crate::query::Query;

/// Appends order clauses to `query`.
///
/// With `for_pagination` the requested order comes first, then every unique
/// key that does not duplicate it. Without it the requested order is left
/// out and all unique keys are appended as given.
pub fn compose<'q>(
    root_alias: &str,
    requested: Option<&OrderDescriptor>,
    unique_keys: &[OrderDescriptor],
    query: &'q mut Query,
    for_pagination: bool,
) -> Result<&'q mut Query> {
    if !for_pagination {
        for key in unique_keys {
            query.order_by(&key.field_path, key.ascending)?;
        }
        return Ok(query);
    }
    if let Some(requested) = requested {
        query.order_by(&requested.field_path, requested.ascending)?;
    }
    for key in unique_keys {
        if !is_duplicate_order(root_alias, key, requested) {
            query.order_by(&key.field_path, key.ascending)?;
        }
    }
    Ok(query)
}

/// True when `unique_key` names the requested field, directly or through
/// `root_alias` (so `Widget.name` duplicates a requested `name`).
pub fn is_duplicate_order(root_alias: &str, unique_key: &OrderDescriptor, requested: Option<&OrderDescriptor>) -> bool {
    let Some(requested) = requested else {
        return false;
    };
    let key = unique_key.field_path.as_str();
    let asked = requested.field_path.as_str();
    if key.eq_ignore_ascii_case(asked) {
        return true;
    }
    // "Widget.name" against a bare "name"
    key.split_once('.').is_some_and(|(alias, rest)| {
        alias.eq_ignore_ascii_case(root_alias) && rest.eq_ignore_ascii_case(asked)
    })
}
