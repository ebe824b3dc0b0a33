//! Filter operators and sort enums for Tessera.
//!
//! All enums serialize in `snake_case` via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for the same string form.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// ---------------------------------------------------------------------------
// FilterOperator
// ---------------------------------------------------------------------------

/// Comparison applied by a single search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Exact, type-sensitive JSON equality.
    Eq,
    /// Key present and not equal.
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring on scalars, membership on arrays.
    Contains,
    /// Key presence, independent of value (including `null`).
    Exists,
    /// Equality against any element of an array value.
    In,
}

impl FilterOperator {
    pub const ALL: [Self; 9] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Contains,
        Self::Exists,
        Self::In,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::Exists => "exists",
            Self::In => "in",
        }
    }

    /// Whether this operator compares numerically.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "filter operator",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// SortDirection
// ---------------------------------------------------------------------------

/// Ordering direction for search results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[serde(alias = "ASC")]
    Asc,
    #[default]
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(UnknownVariant {
                kind: "sort direction",
                value: s.to_string(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// SortColumn
// ---------------------------------------------------------------------------

/// Top-level entity columns that may be used directly as an order target.
///
/// Any other `order_by` value is treated as a document path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    CreatedAt,
    UpdatedAt,
    Identifier,
    Title,
}

impl SortColumn {
    pub const ALL: [Self; 4] = [
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::Identifier,
        Self::Title,
    ];

    /// Column name, identical to the SQL column it orders by.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Identifier => "identifier",
            Self::Title => "title",
        }
    }

    /// Look up an allow-listed column by exact name.
    #[must_use]
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|col| col.as_str() == name)
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_operator_string_forms_roundtrip() {
        for op in FilterOperator::ALL {
            assert_eq!(op.as_str().parse::<FilterOperator>().unwrap(), op);
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, serde_json::Value::String(op.to_string()));
        }
    }

    #[test]
    fn filter_operator_rejects_unknown() {
        let err = "like".parse::<FilterOperator>().unwrap_err();
        assert_eq!(err.to_string(), "unknown filter operator 'like'");
        assert!("EQ".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn numeric_operators() {
        let numeric: Vec<_> = FilterOperator::ALL
            .into_iter()
            .filter(|op| op.is_numeric())
            .collect();
        assert_eq!(
            numeric,
            vec![
                FilterOperator::Gt,
                FilterOperator::Gte,
                FilterOperator::Lt,
                FilterOperator::Lte
            ]
        );
    }

    #[test]
    fn sort_direction_parse_and_default() {
        assert_eq!(SortDirection::default(), SortDirection::Desc);
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());

        let dir: SortDirection = serde_json::from_str("\"ASC\"").unwrap();
        assert_eq!(dir, SortDirection::Asc);
    }

    #[test]
    fn sort_column_allow_list() {
        assert_eq!(
            SortColumn::from_column_name("created_at"),
            Some(SortColumn::CreatedAt)
        );
        assert_eq!(SortColumn::from_column_name("title"), Some(SortColumn::Title));
        assert_eq!(SortColumn::from_column_name("data"), None);
        assert_eq!(SortColumn::from_column_name("Title"), None);
    }
}
