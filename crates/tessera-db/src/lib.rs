//! # tessera-db
//!
//! libSQL storage for Tessera blueprints and entities.
//!
//! [`TesseraDb`] owns the connection, runs migrations and wraps every
//! statement in a timeout (plus transient-error retry in remote mode).
//! The timeout covers both the statement and the row stepping done by
//! [`TesseraDb::query_first`] and [`TesseraDb::query_all`]. It fires only at
//! an await point, so a single local `SQLite` step that blocks runs to
//! completion before the timeout is observed.
//! [`service::TesseraService`] is the entity store: blueprint lifecycle,
//! validated entity writes and filtered search, all scoped to a tenant.
//!
//! Uses the `libsql` crate (C `SQLite` fork) for both embedded files and
//! remote libSQL servers. The `data` column is queried with `SQLite`'s JSON1
//! functions.

pub mod error;
pub mod helpers;
mod migrations;
pub mod registry;
pub mod repos;
pub mod retry;
pub mod service;
pub mod updates;

#[cfg(test)]
pub(crate) mod test_support;

use std::future::Future;
use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::RetryConfig;
use tessera_config::DatabaseConfig;

/// Central database handle.
pub struct TesseraDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    remote: bool,
    statement_timeout: Duration,
    retry: RetryConfig,
}

impl TesseraDb {
    /// Open the database described by `config`, local or remote.
    ///
    /// Runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let remote = config.is_remote();
        let db = if remote {
            Builder::new_remote(config.url.clone(), config.auth_token.clone())
                .build()
                .await?
        } else {
            Builder::new_local(&config.path).build().await?
        };
        let conn = db.connect()?;

        // Per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let tessera_db = Self {
            db,
            conn,
            remote,
            statement_timeout: config.statement_timeout(),
            retry: RetryConfig::from_config(config),
        };
        tessera_db.run_migrations().await?;

        tracing::info!(
            remote,
            path = if remote { config.url.as_str() } else { config.path.as_str() },
            "database opened"
        );
        Ok(tessera_db)
    }

    /// Open a local database file (or `":memory:"`) with default settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open(&DatabaseConfig::local(path)).await
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Generate a prefixed ID via libSQL, e.g. `"ent-3fa8b2c1d4e5f607"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        self.query_first(
            "SELECT ?1 || '-' || lower(hex(randomblob(8)))",
            || [prefix],
            |row| Ok(row.get::<String>(0)?),
        )
        .await?
        .ok_or(DatabaseError::NoResult)
    }

    /// Execute a statement. `params` is called once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Timeout` if the statement exceeds the
    /// configured timeout, or the libSQL error once retries are exhausted.
    pub async fn execute_with<F, P>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        F: Fn() -> P + Send + Sync,
        P: IntoParams + Send,
    {
        let conn = &self.conn;
        let params = &params;
        self.run(move || conn.execute(sql, params())).await
    }

    /// Run a query. `params` is called once per attempt.
    ///
    /// # Errors
    ///
    /// Same as [`TesseraDb::execute_with`].
    pub async fn query_with<F, P>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        F: Fn() -> P + Send + Sync,
        P: IntoParams + Send,
    {
        let conn = &self.conn;
        let params = &params;
        self.run(move || conn.query(sql, params())).await
    }

    /// Run a query and map the first row, if any.
    ///
    /// Stepping the row is bounded by the statement timeout too; local
    /// `SQLite` does most of its work there.
    ///
    /// # Errors
    ///
    /// Same as [`TesseraDb::execute_with`], plus any error from `map`.
    pub async fn query_first<F, P, T, M>(
        &self,
        sql: &str,
        params: F,
        map: M,
    ) -> Result<Option<T>, DatabaseError>
    where
        F: Fn() -> P + Send + Sync,
        P: IntoParams + Send,
        M: Fn(&libsql::Row) -> Result<T, DatabaseError>,
    {
        let mut rows = self.query_with(sql, params).await?;
        let step = async {
            match rows.next().await? {
                Some(row) => map(&row).map(Some),
                None => Ok::<_, DatabaseError>(None),
            }
        };
        self.bounded(step).await
    }

    /// Run a query and map every row. The whole iteration shares one
    /// statement timeout.
    ///
    /// # Errors
    ///
    /// Same as [`TesseraDb::query_first`].
    pub async fn query_all<F, P, T, M>(
        &self,
        sql: &str,
        params: F,
        map: M,
    ) -> Result<Vec<T>, DatabaseError>
    where
        F: Fn() -> P + Send + Sync,
        P: IntoParams + Send,
        M: Fn(&libsql::Row) -> Result<T, DatabaseError>,
    {
        let mut rows = self.query_with(sql, params).await?;
        let collect = async {
            let mut items = Vec::new();
            while let Some(row) = rows.next().await? {
                items.push(map(&row)?);
            }
            Ok::<_, DatabaseError>(items)
        };
        self.bounded(collect).await
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, DatabaseError>>,
    ) -> Result<T, DatabaseError> {
        tokio::time::timeout(self.statement_timeout, fut)
            .await
            .map_err(|_| DatabaseError::Timeout(self.statement_timeout))?
    }

    async fn run<T, Op, Fut>(&self, op: Op) -> Result<T, DatabaseError>
    where
        Op: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, libsql::Error>> + Send,
    {
        let mut delay = self.retry.base_delay;
        let mut attempt = 1;
        loop {
            let result = tokio::time::timeout(self.statement_timeout, op())
                .await
                .map_err(|_| DatabaseError::Timeout(self.statement_timeout))?;
            match result {
                Ok(value) => return Ok(value),
                Err(e) if self.remote && attempt < self.retry.max_attempts && retry::is_transient(&e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        ?delay,
                        error = %e,
                        "transient libSQL error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = self.retry.next_delay(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> TesseraDb {
        TesseraDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        for table in ["blueprints", "entities"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            assert!(rows.next().await.unwrap().is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_format_and_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("ent").await.unwrap();
            assert!(id.starts_with("ent-"), "{id}");
            assert_eq!(id.len(), 20, "3 prefix + dash + 16 hex: {id}");
            assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
            assert!(ids.insert(id.clone()), "duplicate id {id}");
        }
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in tessera_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn query_all_steps_every_row() {
        let db = test_db().await;
        let values = db
            .query_all(
                "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < ?1) SELECT x FROM n",
                || [5_i64],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await
            .unwrap();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);

        let none = db
            .query_first("SELECT 1 WHERE 0", || (), |row| Ok(row.get::<i64>(0)?))
            .await
            .unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn row_stepping_is_bounded_by_statement_timeout() {
        let config = DatabaseConfig {
            statement_timeout_ms: 50,
            ..DatabaseConfig::local(":memory:")
        };
        let db = TesseraDb::open(&config).await.unwrap();
        let err = db
            .bounded(std::future::pending::<Result<(), DatabaseError>>())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn entities_unique_per_tenant_blueprint_identifier() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO blueprints (tenant_id, id, title) VALUES ('t1', 'service', 'Service');
                 INSERT INTO entities (id, tenant_id, blueprint_id, identifier) VALUES ('ent-1', 't1', 'service', 'checkout');",
            )
            .await
            .unwrap();

        let dup = db
            .execute_with(
                "INSERT INTO entities (id, tenant_id, blueprint_id, identifier) VALUES ('ent-2', 't1', 'service', 'checkout')",
                || (),
            )
            .await
            .unwrap_err();
        assert!(helpers::is_unique_violation(&dup), "{dup}");
    }

    #[tokio::test]
    async fn data_column_must_be_json() {
        let db = test_db().await;
        db.conn()
            .execute("INSERT INTO blueprints (tenant_id, id, title) VALUES ('t1', 'service', 'Service')", ())
            .await
            .unwrap();
        let result = db
            .conn()
            .execute(
                "INSERT INTO entities (id, tenant_id, blueprint_id, identifier, data) VALUES ('ent-1', 't1', 'service', 'x', '{oops')",
                (),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn entities_require_existing_blueprint() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO entities (id, tenant_id, blueprint_id, identifier) VALUES ('ent-1', 't1', 'ghost', 'x')",
                (),
            )
            .await;
        assert!(result.is_err(), "foreign key should reject unknown blueprint");
    }
}
