//! Schema validation error types.

use tessera_core::validation::FieldError;
use thiserror::Error;

/// Errors from validation and the wire-schema catalog.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested wire schema name was not found in the catalog.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// Document did not pass validation. One entry per violated constraint.
    #[error("Validation failed: {}", format_errors(.errors))]
    ValidationFailed { errors: Vec<FieldError> },

    /// The schema document itself is malformed or does not compile.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
