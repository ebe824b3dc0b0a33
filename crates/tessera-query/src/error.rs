//! Filter compilation error types.
//!
//! Every variant is an invalid-filter condition: the caller sent a filter
//! the compiler refuses to turn into a query.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A property path failed the `[A-Za-z0-9_]+(\.[A-Za-z0-9_]+)*` grammar.
    #[error("invalid property path '{path}': {reason}")]
    InvalidProperty { path: String, reason: String },

    /// Operator name is not one of the nine supported operators.
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    /// Operator and value do not fit together (e.g. `in` without an array).
    #[error("invalid value for '{property}' {operator}: {reason}")]
    InvalidValue {
        property: String,
        operator: String,
        reason: String,
    },

    /// Raw filter JSON is not shaped like `{property, operator, value}`.
    #[error("malformed filter at index {index}: {reason}")]
    Malformed { index: usize, reason: String },
}
