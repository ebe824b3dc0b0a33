//! Service layer: the Tessera entity store.
//!
//! `TesseraService` wraps `TesseraDb` (storage and schema registry), an
//! injected [`DocumentValidator`] and the search page limits. Blueprint and
//! entity operations are implemented as `impl TesseraService` in
//! [`crate::repos`].

use std::sync::Arc;

use tessera_config::TesseraConfig;
use tessera_query::PageLimits;
use tessera_schema::{DocumentValidator, JsonSchemaValidator};

use crate::TesseraDb;
use crate::error::DatabaseError;

/// Entity store over a libSQL database.
///
/// Holds no mutable state of its own; share it behind an `Arc` and call it
/// from as many tasks as needed.
pub struct TesseraService {
    db: TesseraDb,
    validator: Arc<dyn DocumentValidator>,
    limits: PageLimits,
}

impl TesseraService {
    /// Open the configured database with the `jsonschema` validator.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open(config: &TesseraConfig) -> Result<Self, DatabaseError> {
        let db = TesseraDb::open(&config.database).await?;
        let limits = PageLimits {
            default_limit: config.query.default_limit,
            max_limit: config.query.max_limit,
        };
        Ok(Self::new(db, Arc::new(JsonSchemaValidator::new()), limits))
    }

    #[must_use]
    pub fn new(db: TesseraDb, validator: Arc<dyn DocumentValidator>, limits: PageLimits) -> Self {
        Self {
            db,
            validator,
            limits,
        }
    }

    /// Wrap an existing `TesseraDb` with the default validator and limits.
    #[must_use]
    pub fn from_db(db: TesseraDb) -> Self {
        Self::new(db, Arc::new(JsonSchemaValidator::new()), PageLimits::default())
    }

    #[must_use]
    pub const fn db(&self) -> &TesseraDb {
        &self.db
    }

    #[must_use]
    pub fn validator(&self) -> &dyn DocumentValidator {
        self.validator.as_ref()
    }

    #[must_use]
    pub const fn limits(&self) -> &PageLimits {
        &self.limits
    }
}
