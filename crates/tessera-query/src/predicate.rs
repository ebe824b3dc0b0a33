//! Backend-agnostic predicate tree produced by the compiler.
//!
//! Values stay as JSON; only renderers decide how they are bound. A
//! compiled search is the conjunction of its predicates.

use serde_json::{Number, Value};

use crate::path::PropertyPath;

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// One compiled filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Type-sensitive JSON equality at `path`.
    Equals { path: PropertyPath, value: Value },
    /// `path` is present and its value is not equal to `value`.
    NotEquals { path: PropertyPath, value: Value },
    /// Numeric comparison; non-numeric values at `path` never match.
    Compare {
        path: PropertyPath,
        op: Comparison,
        value: Number,
    },
    /// Array membership when `path` holds an array, otherwise a
    /// case-insensitive substring match on the stringified value.
    Contains { path: PropertyPath, needle: Value },
    /// Key presence at `path` (explicit `null` counts as present).
    Exists { path: PropertyPath, present: bool },
    /// Equality against any of `values`. Empty `values` never matches.
    In { path: PropertyPath, values: Vec<Value> },
}

impl Predicate {
    #[must_use]
    pub const fn path(&self) -> &PropertyPath {
        match self {
            Self::Equals { path, .. }
            | Self::NotEquals { path, .. }
            | Self::Compare { path, .. }
            | Self::Contains { path, .. }
            | Self::Exists { path, .. }
            | Self::In { path, .. } => path,
        }
    }
}
