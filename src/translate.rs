//! Translation of string-typed filter descriptors into typed predicates.

use tracing::debug;

use crate::criteria::{FilterDescriptor, FilterOperator};
use crate::error::Result;
use crate::query::Query;
use crate::schema::{EntitySchema, FieldKind};

/// Starts a query over `schema` aliased `root_alias` and applies `filters` to it.
pub fn translate(schema: &'static EntitySchema, root_alias: &str, filters: &[FilterDescriptor]) -> Result<Query> {
    let mut query = Query::from(schema, root_alias)?;
    apply_filters(&mut query, filters)?;
    Ok(query)
}

/// Applies each filter in input order; all of them must hold.
///
/// Fails on the first filter whose path does not resolve or whose value does
/// not coerce to the kind of its field. Filters already applied stay on the
/// query in that case.
pub fn apply_filters(query: &mut Query, filters: &[FilterDescriptor]) -> Result<()> {
    for filter in filters {
        apply_filter(query, filter)?;
    }
    Ok(())
}

fn apply_filter(query: &mut Query, filter: &FilterDescriptor) -> Result<()> {
    let field = query.field(&filter.field_path)?;
    let kind = field.kind();
    let path = filter.field_path.as_str();
    let raw = filter.value.as_str();
    debug!(entity = query.schema().name(), path, operator = ?filter.operator, "applying filter");
    let restriction = query.where_path(path)?;
    match filter.operator {
        FilterOperator::Eq => {
            restriction.eq(kind.coerce_native(path, raw)?);
        }
        FilterOperator::BoolEq => {
            restriction.eq(FieldKind::coerce_bool(raw));
        }
        FilterOperator::Gt => {
            restriction.gt(kind.coerce_integer(path, raw)?);
        }
        FilterOperator::Gte => {
            restriction.ge(kind.coerce_integer(path, raw)?);
        }
        FilterOperator::Lt => {
            restriction.lt(kind.coerce_integer(path, raw)?);
        }
        FilterOperator::Lte => {
            restriction.le(kind.coerce_integer(path, raw)?);
        }
        FilterOperator::Neq => {
            restriction.not_eq(kind.coerce_integer(path, raw)?);
        }
        FilterOperator::Like => {
            restriction.like_ignore_case(&FieldKind::coerce_pattern(raw));
        }
    }
    Ok(())
}
