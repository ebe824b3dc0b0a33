//! Validation failure details shared by the validator and the store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path of the document root in a [`FieldError`].
pub const ROOT_PATH: &str = "$";

/// One violated constraint: where it was violated and why.
///
/// `field_path` uses dot notation for object keys and `[i]` for array
/// indices (`address.city`, `tags[2]`); the document root is `$`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub field_path: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
        }
    }

    /// A failure located at the document root.
    #[must_use]
    pub fn root(message: impl Into<String>) -> Self {
        Self::new(ROOT_PATH, message)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_path, self.message)
    }
}
