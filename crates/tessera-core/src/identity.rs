use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tenant identity for a single request.
///
/// Produced by the authentication layer (JWT or API key) and passed into
/// every store operation. The tenant is never read from a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TenantContext {
    /// Tenant that owns every row touched by the request.
    pub tenant_id: String,
}

impl TenantContext {
    #[must_use]
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
        }
    }

    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}
