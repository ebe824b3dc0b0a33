//! Retry of transient remote libSQL errors.
//!
//! Remote databases (Turso / libSQL server) occasionally reject a request
//! while a node is recycled or a shared lock is held during provisioning.
//! Those errors clear on their own within seconds. Local databases never
//! produce them, and [`crate::TesseraDb`] only retries in remote mode.

use std::time::Duration;

use tessera_config::DatabaseConfig;

/// Retry behavior for transient remote errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Backoff is capped here.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.max(1),
            base_delay: config.retry_base_delay(),
            max_delay: config.retry_max_delay(),
        }
    }

    /// Delay after `delay`, doubled and capped.
    #[must_use]
    pub fn next_delay(&self, delay: Duration) -> Duration {
        delay.saturating_mul(2).min(self.max_delay)
    }
}

/// Detect transient remote infrastructure errors.
///
/// Deliberately narrow: SQL and constraint errors are never retried.
#[must_use]
pub fn is_transient(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unable to acquire shared lock")
        || msg.contains("deletion must be in progress")
        || msg.contains("database is locked")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let cfg = RetryConfig::default();
        let mut delay = cfg.base_delay;
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(delay.as_millis());
            delay = cfg.next_delay(delay);
        }
        assert_eq!(seen, vec![100, 200, 400, 800, 1600, 2000]);
    }

    #[test]
    fn from_config_keeps_at_least_one_attempt() {
        let mut db = DatabaseConfig::local(":memory:");
        db.retry_max_attempts = 0;
        db.retry_base_delay_ms = 10;
        let cfg = RetryConfig::from_config(&db);
        assert_eq!(cfg.max_attempts, 1);
        assert_eq!(cfg.base_delay, Duration::from_millis(10));
    }

    #[test]
    fn constraint_errors_are_not_transient() {
        let e = libsql::Error::SqliteFailure(19, "UNIQUE constraint failed: entities.identifier".into());
        assert!(!is_transient(&e));
        let e = libsql::Error::SqliteFailure(5, "database is locked".into());
        assert!(is_transient(&e));
    }
}
