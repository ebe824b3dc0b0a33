//! Response shapes returned by the entity store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Entity;

/// One page of search results.
///
/// `total` counts every entity matching the filters, independent of the
/// page's `limit` and `offset`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SearchPage {
    pub items: Vec<Entity>,
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
}
