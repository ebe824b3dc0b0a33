//! Error types for tessera-db.
//!
//! `DatabaseError` covers everything below the entity store (libSQL, stored
//! data, timeouts). `StoreError` is what store callers match on.

use std::time::Duration;

use tessera_core::validation::FieldError;
use tessera_query::QueryError;
use tessera_schema::SchemaError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., a stored schema that does not compile).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A statement did not finish within the configured timeout.
    #[error("Statement timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors returned by blueprint and entity operations.
///
/// Every variant except `Internal` is an expected outcome of a bad or
/// conflicting request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blueprint not found: {blueprint_id}")]
    BlueprintNotFound { blueprint_id: String },

    #[error("Blueprint already exists: {blueprint_id}")]
    BlueprintAlreadyExists { blueprint_id: String },

    #[error("Entity not found: {id}")]
    EntityNotFound { id: String },

    /// Identifier already taken within `(tenant, blueprint)`.
    #[error("Entity already exists: {blueprint_id}/{identifier}")]
    AlreadyExists {
        blueprint_id: String,
        identifier: String,
    },

    #[error("Validation failed: {}", format_errors(.errors))]
    ValidationFailed { errors: Vec<FieldError> },

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] QueryError),

    /// A blueprint write carried a schema document that does not compile.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Internal(#[from] DatabaseError),
}

impl StoreError {
    /// `true` for outcomes caused by the request, `false` for storage or
    /// stored-data failures.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    pub(crate) fn validation(error: FieldError) -> Self {
        Self::ValidationFailed {
            errors: vec![error],
        }
    }
}

impl From<libsql::Error> for StoreError {
    fn from(e: libsql::Error) -> Self {
        Self::Internal(DatabaseError::LibSql(e))
    }
}

/// Map a validator result for a document write.
///
/// A schema that fails to compile at this point was stored earlier, so it is
/// an internal error rather than the caller's fault.
impl From<SchemaError> for StoreError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::ValidationFailed { errors } => Self::ValidationFailed { errors },
            SchemaError::InvalidSchema(msg) => Self::Internal(DatabaseError::InvalidState(
                format!("stored blueprint schema does not compile: {msg}"),
            )),
            SchemaError::NotFound(name) => {
                Self::Internal(DatabaseError::InvalidState(format!("unknown schema {name}")))
            }
        }
    }
}

fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
