//! Request shapes accepted by the entity store and blueprint registry.
//!
//! These are the language-agnostic wire shapes; the tenant never appears in
//! them and is supplied separately through [`crate::identity::TenantContext`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{FilterOperator, SortDirection};

/// One search clause: `{property, operator, value}`.
///
/// `property` is a dot-separated document path. Its grammar is enforced by
/// the filter compiler, not by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Filter {
    pub property: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Filter {
    #[must_use]
    pub fn new(
        property: impl Into<String>,
        operator: FilterOperator,
        value: serde_json::Value,
    ) -> Self {
        Self {
            property: property.into(),
            operator,
            value,
        }
    }
}

/// `CreateEntity(blueprintId, identifier, title?, data)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreateEntity {
    pub blueprint_id: String,
    pub identifier: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

/// `UpdateEntity(title?, dataPatch?)`.
///
/// `data` is shallow-merged over the stored document: top-level keys in the
/// patch overwrite, absent keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpdateEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// `SearchEntities(blueprintId, filters[], orderBy?, orderDir?, limit?, offset?)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchEntities {
    pub blueprint_id: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_dir: Option<SortDirection>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl SearchEntities {
    #[must_use]
    pub fn new(blueprint_id: impl Into<String>) -> Self {
        Self {
            blueprint_id: blueprint_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn order(mut self, order_by: impl Into<String>, dir: SortDirection) -> Self {
        self.order_by = Some(order_by.into());
        self.order_dir = Some(dir);
        self
    }

    #[must_use]
    pub const fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Blueprint definition submitted by the registry owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreateBlueprint {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object")]
    pub schema: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
