//! Database migration runner.
//!
//! Migrations are embedded at compile time and run on every open. All
//! statements use `IF NOT EXISTS`, so re-running is a no-op.

use crate::TesseraDb;
use crate::error::DatabaseError;

/// Blueprints and entities tables plus the search indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl TesseraDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        tracing::debug!("migrations applied");
        Ok(())
    }
}
