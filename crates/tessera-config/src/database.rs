//! libSQL database configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "tessera.db".to_string()
}

const fn default_statement_timeout_ms() -> u64 {
    5_000
}

const fn default_retry_max_attempts() -> u32 {
    4
}

const fn default_retry_base_delay_ms() -> u64 {
    100
}

const fn default_retry_max_delay_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Local database file, or `":memory:"`. Ignored in remote mode.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote libSQL URL (e.g. `libsql://tessera-prod.turso.io`).
    #[serde(default)]
    pub url: String,

    /// Auth token for the remote database.
    #[serde(default)]
    pub auth_token: String,

    /// Upper bound for a single statement, including stepping its rows, in
    /// milliseconds.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,

    /// Attempts (including the first) for transient remote errors.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
            statement_timeout_ms: default_statement_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Local database at `path` with every other setting defaulted.
    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Remote mode needs both a URL and a token.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    #[must_use]
    pub const fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.statement_timeout_ms)
    }

    #[must_use]
    pub const fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    #[must_use]
    pub const fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }
}
