//! Blueprint schema lookup.
//!
//! The registry is a thin `(tenant, blueprint) -> schema` lookup. It does no
//! validation and no caching; callers that want a cache wrap it.

use std::future::Future;

/// Source of blueprint schemas.
///
/// `Ok(None)` means the blueprint does not exist for that tenant. `Err` is
/// reserved for backend failures.
pub trait SchemaRegistry: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(
        &self,
        tenant_id: &str,
        blueprint_id: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, Self::Error>> + Send;
}
