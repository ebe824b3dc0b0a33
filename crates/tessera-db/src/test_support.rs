//! Shared helpers for the crate's unit tests.

use serde_json::json;
use tessera_core::identity::TenantContext;
use tessera_core::requests::CreateBlueprint;

use crate::TesseraDb;
use crate::service::TesseraService;

/// Route `tracing` output to the test harness. `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory service with default validator and limits.
pub async fn test_service() -> TesseraService {
    init_tracing();
    let db = TesseraDb::open_local(":memory:").await.unwrap();
    TesseraService::from_db(db)
}

pub fn tenant() -> TenantContext {
    TenantContext::new("tenant-a")
}

/// `service` blueprint: `name` required, optional `tier` integer and `tags`.
pub fn service_blueprint() -> CreateBlueprint {
    CreateBlueprint {
        id: "service".into(),
        title: "Service".into(),
        description: None,
        schema: json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string"},
                "tier": {"type": "integer", "minimum": 1},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }),
    }
}
