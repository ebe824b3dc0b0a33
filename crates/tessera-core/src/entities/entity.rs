use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A validated document instance of a blueprint.
///
/// `identifier` is fixed for the life of the entity and unique within
/// `(tenant_id, blueprint_id)`. `data` satisfied the blueprint schema at the
/// instant of the write that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Entity {
    pub id: String,
    pub tenant_id: String,
    pub blueprint_id: String,
    pub identifier: String,
    pub title: Option<String>,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
