//! Blueprint repository: the registry owner's side of the schema registry.

use tessera_core::entities::Blueprint;
use tessera_core::identity::TenantContext;
use tessera_core::requests::CreateBlueprint;
use tessera_core::validation::FieldError;

use crate::error::{DatabaseError, StoreError};
use crate::helpers::{
    format_timestamp, get_opt_string, is_unique_violation, now_utc, parse_datetime, parse_json,
    to_json_text,
};
use crate::service::TesseraService;
use crate::updates::blueprint::BlueprintUpdate;

const BLUEPRINT_COLUMNS: &str =
    "tenant_id, id, title, description, schema, created_at, updated_at";

fn row_to_blueprint(row: &libsql::Row) -> Result<Blueprint, DatabaseError> {
    Ok(Blueprint {
        tenant_id: row.get::<String>(0)?,
        id: row.get::<String>(1)?,
        title: row.get::<String>(2)?,
        description: get_opt_string(row, 3)?,
        schema: parse_json(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl TesseraService {
    fn check_blueprint_schema(&self, schema: &serde_json::Value) -> Result<(), StoreError> {
        self.validator()
            .check_schema(schema)
            .map_err(|e| StoreError::InvalidSchema(e.to_string()))
    }

    pub async fn create_blueprint(
        &self,
        ctx: &TenantContext,
        req: CreateBlueprint,
    ) -> Result<Blueprint, StoreError> {
        if req.id.trim().is_empty() {
            return Err(StoreError::validation(FieldError::new("id", "must not be empty")));
        }
        self.check_blueprint_schema(&req.schema)?;

        let now = now_utc();
        let schema_text = to_json_text(&req.schema)?;
        let result = self
            .db()
            .execute_with(
                "INSERT INTO blueprints (tenant_id, id, title, description, schema, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                || {
                    libsql::params![
                        ctx.tenant_id(),
                        req.id.as_str(),
                        req.title.as_str(),
                        req.description.as_deref(),
                        schema_text.as_str(),
                        format_timestamp(now),
                        format_timestamp(now)
                    ]
                },
            )
            .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::BlueprintAlreadyExists {
                    blueprint_id: req.id,
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(tenant_id = ctx.tenant_id(), blueprint_id = %req.id, "blueprint created");

        Ok(Blueprint {
            tenant_id: ctx.tenant_id().to_string(),
            id: req.id,
            title: req.title,
            description: req.description,
            schema: req.schema,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_blueprint(
        &self,
        ctx: &TenantContext,
        blueprint_id: &str,
    ) -> Result<Blueprint, StoreError> {
        let sql = format!("SELECT {BLUEPRINT_COLUMNS} FROM blueprints WHERE tenant_id = ?1 AND id = ?2");
        self.db()
            .query_first(&sql, || [ctx.tenant_id(), blueprint_id], row_to_blueprint)
            .await?
            .ok_or_else(|| StoreError::BlueprintNotFound {
                blueprint_id: blueprint_id.to_string(),
            })
    }

    pub async fn list_blueprints(&self, ctx: &TenantContext) -> Result<Vec<Blueprint>, StoreError> {
        let sql = format!("SELECT {BLUEPRINT_COLUMNS} FROM blueprints WHERE tenant_id = ?1 ORDER BY id");
        Ok(self
            .db()
            .query_all(&sql, || [ctx.tenant_id()], row_to_blueprint)
            .await?)
    }

    /// Apply `update`. Existing entities are not re-validated against a new
    /// schema.
    pub async fn update_blueprint(
        &self,
        ctx: &TenantContext,
        blueprint_id: &str,
        update: BlueprintUpdate,
    ) -> Result<Blueprint, StoreError> {
        if update.is_empty() {
            return self.get_blueprint(ctx, blueprint_id).await;
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref title) = update.title {
            sets.push(format!("title = ?{idx}"));
            params.push(title.as_str().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(description.as_deref().into());
            idx += 1;
        }
        if let Some(ref schema) = update.schema {
            self.check_blueprint_schema(schema)?;
            sets.push(format!("schema = ?{idx}"));
            params.push(to_json_text(schema)?.into());
            idx += 1;
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_timestamp(now_utc()).into());
        idx += 1;

        params.push(ctx.tenant_id().into());
        params.push(blueprint_id.into());
        let sql = format!(
            "UPDATE blueprints SET {} WHERE tenant_id = ?{idx} AND id = ?{}",
            sets.join(", "),
            idx + 1
        );

        let changed = self
            .db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        if changed == 0 {
            return Err(StoreError::BlueprintNotFound {
                blueprint_id: blueprint_id.to_string(),
            });
        }

        tracing::info!(
            tenant_id = ctx.tenant_id(),
            blueprint_id,
            schema_changed = update.schema.is_some(),
            "blueprint updated"
        );
        self.get_blueprint(ctx, blueprint_id).await
    }

    /// Delete a blueprint and, through the foreign key, all of its entities.
    pub async fn delete_blueprint(
        &self,
        ctx: &TenantContext,
        blueprint_id: &str,
    ) -> Result<(), StoreError> {
        let changed = self
            .db()
            .execute_with(
                "DELETE FROM blueprints WHERE tenant_id = ?1 AND id = ?2",
                || [ctx.tenant_id(), blueprint_id],
            )
            .await?;
        if changed == 0 {
            return Err(StoreError::BlueprintNotFound {
                blueprint_id: blueprint_id.to_string(),
            });
        }
        tracing::info!(tenant_id = ctx.tenant_id(), blueprint_id, "blueprint deleted");
        Ok(())
    }
}
