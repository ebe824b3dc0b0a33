//! `SchemaRegistry` backed by the `blueprints` table.

use tessera_schema::SchemaRegistry;

use crate::TesseraDb;
use crate::error::DatabaseError;
use crate::helpers::parse_json;

impl SchemaRegistry for TesseraDb {
    type Error = DatabaseError;

    async fn get(
        &self,
        tenant_id: &str,
        blueprint_id: &str,
    ) -> Result<Option<serde_json::Value>, Self::Error> {
        self.query_first(
            "SELECT schema FROM blueprints WHERE tenant_id = ?1 AND id = ?2",
            || [tenant_id, blueprint_id],
            |row| parse_json(&row.get::<String>(0)?),
        )
        .await
    }
}
