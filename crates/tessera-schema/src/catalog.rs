//! JSON Schemas for the wire shapes in `tessera-core`.
//!
//! `WireSchemas` builds the schemas at construction time with
//! [`schemars::schema_for!`] and validates raw JSON through `jsonschema`, so a
//! caller holding an untyped request body can reject it with field-level
//! errors before deserializing.

use std::collections::HashMap;

use schemars::schema_for;
use tessera_core::entities::{Blueprint, Entity};
use tessera_core::requests::{CreateBlueprint, CreateEntity, Filter, SearchEntities, UpdateEntity};
use tessera_core::responses::SearchPage;

use crate::error::SchemaError;
use crate::validator::field_errors;

/// Named catalog of wire-shape schemas.
pub struct WireSchemas {
    schemas: HashMap<&'static str, serde_json::Value>,
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, schema_for!($ty).to_value());
    };
}

impl WireSchemas {
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Requests ---
        register!(schemas, "create_entity", CreateEntity);
        register!(schemas, "update_entity", UpdateEntity);
        register!(schemas, "search_entities", SearchEntities);
        register!(schemas, "filter", Filter);
        register!(schemas, "create_blueprint", CreateBlueprint);

        // --- Responses ---
        register!(schemas, "entity", Entity);
        register!(schemas, "blueprint", Blueprint);
        register!(schemas, "search_page", SearchPage);

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the name is unknown, or
    /// `SchemaError::ValidationFailed` listing every violation.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::InvalidSchema(e.to_string()))?;

        let errors = field_errors(&validator, instance);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// All registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for WireSchemas {
    fn default() -> Self {
        Self::new()
    }
}
