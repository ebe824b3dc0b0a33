//! # tessera-query
//!
//! Filter compiler for Tessera entity search.
//!
//! A search request is compiled in two steps:
//! - [`compile`] validates every filter, the ordering and the page window,
//!   producing a backend-agnostic [`CompiledQuery`]. Nothing is rendered
//!   until the whole request is known to be valid.
//! - [`sqlite::render`] turns a `CompiledQuery` into numbered-parameter SQL
//!   for the libSQL store.
//!
//! The compiler never touches I/O and knows nothing about blueprints.

pub mod error;
pub mod filter;
pub mod order;
pub mod page;
pub mod path;
pub mod predicate;
pub mod sqlite;

pub use error::QueryError;
pub use filter::{compile_filter, parse_filters};
pub use order::{OrderTarget, Ordering, compile_order};
pub use page::{Page, PageLimits};
pub use path::PropertyPath;
pub use predicate::{Comparison, Predicate};

use tessera_core::requests::SearchEntities;

/// A validated search: conjunction of predicates, ordering, page window.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub filters: Vec<Predicate>,
    pub order: Ordering,
    pub page: Page,
}

/// Compile a search request.
///
/// # Errors
///
/// Returns the first `QueryError` found, checking filters in order and
/// then the ordering target.
pub fn compile(search: &SearchEntities, limits: &PageLimits) -> Result<CompiledQuery, QueryError> {
    let filters = search
        .filters
        .iter()
        .map(compile_filter)
        .collect::<Result<Vec<_>, _>>()?;
    let order = compile_order(search.order_by.as_deref(), search.order_dir)?;
    let page = limits.clamp(search.limit, search.offset);

    tracing::debug!(
        filters = filters.len(),
        limit = page.limit,
        offset = page.offset,
        "compiled search"
    );

    Ok(CompiledQuery {
        filters,
        order,
        page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tessera_core::enums::{FilterOperator, SortColumn, SortDirection};
    use tessera_core::requests::Filter;

    #[test]
    fn compiles_full_request() {
        let search = SearchEntities::new("service")
            .filter(Filter::new("tier", FilterOperator::Lte, json!(2)))
            .order("title", SortDirection::Asc)
            .page(500, -1);

        let compiled = compile(&search, &PageLimits::default()).unwrap();
        assert_eq!(compiled.filters.len(), 1);
        assert_eq!(
            compiled.order,
            Ordering {
                target: OrderTarget::Column(SortColumn::Title),
                direction: SortDirection::Asc,
            }
        );
        assert_eq!(
            compiled.page,
            Page {
                limit: 50,
                offset: 0
            }
        );
    }

    #[test]
    fn one_bad_filter_rejects_the_whole_request() {
        let search = SearchEntities::new("service")
            .filter(Filter::new("tier", FilterOperator::Eq, json!(1)))
            .filter(Filter::new("tier;--", FilterOperator::Eq, json!(1)));

        let err = compile(&search, &PageLimits::default()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidProperty { ref path, .. } if path == "tier;--"));
    }

    #[test]
    fn bad_order_path_rejects_request() {
        let search = SearchEntities::new("service").order("data->>'x'", SortDirection::Desc);
        assert!(matches!(
            compile(&search, &PageLimits::default()),
            Err(QueryError::InvalidProperty { .. })
        ));
    }
}
