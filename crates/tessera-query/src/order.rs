//! Result ordering.

use tessera_core::enums::{SortColumn, SortDirection};

use crate::error::QueryError;
use crate::path::PropertyPath;

/// What a search orders by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTarget {
    /// One of the allow-listed top-level columns.
    Column(SortColumn),
    /// The string value extracted at a document path.
    Path(PropertyPath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub target: OrderTarget,
    pub direction: SortDirection,
}

impl Default for Ordering {
    fn default() -> Self {
        Self {
            target: OrderTarget::Column(SortColumn::CreatedAt),
            direction: SortDirection::Desc,
        }
    }
}

/// Resolve `order_by`/`order_dir`.
///
/// Allow-listed column names order by that column. Anything else is a
/// document path and goes through the same grammar check as filter
/// properties. No `order_by` means `created_at`; no direction means `desc`.
///
/// # Errors
///
/// Returns `QueryError::InvalidProperty` when a path-style `order_by` fails
/// the grammar.
pub fn compile_order(
    order_by: Option<&str>,
    direction: Option<SortDirection>,
) -> Result<Ordering, QueryError> {
    let direction = direction.unwrap_or_default();
    let target = match order_by.map(str::trim).filter(|s| !s.is_empty()) {
        None => OrderTarget::Column(SortColumn::CreatedAt),
        Some(name) => match SortColumn::from_column_name(name) {
            Some(column) => OrderTarget::Column(column),
            None => OrderTarget::Path(PropertyPath::parse(name)?),
        },
    };
    Ok(Ordering { target, direction })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_created_at_desc() {
        assert_eq!(compile_order(None, None).unwrap(), Ordering::default());
        assert_eq!(compile_order(Some("  "), None).unwrap(), Ordering::default());
    }

    #[test]
    fn allow_listed_columns() {
        let order = compile_order(Some("identifier"), Some(SortDirection::Asc)).unwrap();
        assert_eq!(order.target, OrderTarget::Column(SortColumn::Identifier));
        assert_eq!(order.direction, SortDirection::Asc);
    }

    #[test]
    fn other_names_are_document_paths() {
        let order = compile_order(Some("spec.priority"), None).unwrap();
        assert_eq!(
            order.target,
            OrderTarget::Path(PropertyPath::parse("spec.priority").unwrap())
        );
    }

    #[test]
    fn path_order_is_grammar_checked() {
        let err = compile_order(Some("created_at; DROP TABLE entities"), None).unwrap_err();
        assert!(matches!(err, QueryError::InvalidProperty { .. }));
    }
}
