use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A tenant-scoped, runtime-defined entity type.
///
/// `schema` is a JSON-Schema-like document. It may change after entities
/// exist against it; existing entities are not re-validated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Blueprint {
    pub tenant_id: String,
    /// Tenant-unique blueprint identifier (e.g. `"service"`).
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
