//! Search pagination configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_limit() -> u32 {
    50
}

const fn default_max_limit() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Page size used when a search omits `limit` or sends one out of range.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Largest page size a search may request.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl QueryConfig {
    /// Check `0 < default_limit <= max_limit`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "query.max_limit".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::InvalidValue {
                field: "query.default_limit".into(),
                reason: format!("must be in 1..={}", self.max_limit),
            });
        }
        Ok(())
    }
}
