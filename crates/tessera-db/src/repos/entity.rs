//! Entity repository: validated create/update, lookup, delete and search.

use serde_json::Value;

use tessera_core::entities::Entity;
use tessera_core::identity::TenantContext;
use tessera_core::ids::PREFIX_ENTITY;
use tessera_core::requests::{CreateEntity, SearchEntities, UpdateEntity};
use tessera_core::responses::SearchPage;
use tessera_core::validation::FieldError;
use tessera_query::sqlite::{self, DocumentTable};
use tessera_schema::{SchemaRegistry, ValidationMode};

use crate::error::{DatabaseError, StoreError};
use crate::helpers::{
    format_timestamp, get_opt_string, is_unique_violation, now_utc, parse_datetime, parse_json,
    to_json_text, to_libsql,
};
use crate::service::TesseraService;

const ENTITY_COLUMNS: &str =
    "e.id, e.tenant_id, e.blueprint_id, e.identifier, e.title, e.data, e.created_at, e.updated_at";

/// How search SQL refers to the entities table.
const ENTITY_TABLE: DocumentTable = DocumentTable {
    alias: "e",
    document_column: "data",
    id_column: "id",
};

fn row_to_entity(row: &libsql::Row) -> Result<Entity, DatabaseError> {
    Ok(Entity {
        id: row.get::<String>(0)?,
        tenant_id: row.get::<String>(1)?,
        blueprint_id: row.get::<String>(2)?,
        identifier: row.get::<String>(3)?,
        title: get_opt_string(row, 4)?,
        data: parse_json(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Top-level keys of `patch` replace those of `base`; other keys are kept.
fn shallow_merge(base: &mut Value, patch: serde_json::Map<String, Value>) {
    if let Value::Object(base) = base {
        base.extend(patch);
    } else {
        *base = Value::Object(patch);
    }
}

fn require_object(data: &Value, field: &str) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::validation(FieldError::new(
            field,
            "must be a JSON object",
        )))
    }
}

impl TesseraService {
    /// Current schema for a blueprint; a missing blueprint is a client error.
    async fn blueprint_schema(
        &self,
        ctx: &TenantContext,
        blueprint_id: &str,
    ) -> Result<Value, StoreError> {
        self.db()
            .get(ctx.tenant_id(), blueprint_id)
            .await?
            .ok_or_else(|| StoreError::BlueprintNotFound {
                blueprint_id: blueprint_id.to_string(),
            })
    }

    async fn identifier_taken(
        &self,
        ctx: &TenantContext,
        blueprint_id: &str,
        identifier: &str,
    ) -> Result<bool, DatabaseError> {
        let found = self
            .db()
            .query_first(
                "SELECT 1 FROM entities WHERE tenant_id = ?1 AND blueprint_id = ?2 AND identifier = ?3",
                || [ctx.tenant_id(), blueprint_id, identifier],
                |_| Ok(()),
            )
            .await?;
        Ok(found.is_some())
    }

    pub async fn create_entity(
        &self,
        ctx: &TenantContext,
        req: CreateEntity,
    ) -> Result<Entity, StoreError> {
        let schema = self.blueprint_schema(ctx, &req.blueprint_id).await?;

        if req.identifier.trim().is_empty() {
            return Err(StoreError::validation(FieldError::new(
                "identifier",
                "must not be empty",
            )));
        }
        require_object(&req.data, "data")?;
        self.validator()
            .validate(&req.data, &schema, ValidationMode::Full)?;

        let already_exists = || StoreError::AlreadyExists {
            blueprint_id: req.blueprint_id.clone(),
            identifier: req.identifier.clone(),
        };
        if self
            .identifier_taken(ctx, &req.blueprint_id, &req.identifier)
            .await?
        {
            return Err(already_exists());
        }

        let now = now_utc();
        let id = self.db().generate_id(PREFIX_ENTITY).await?;
        let data_text = to_json_text(&req.data)?;

        // The UNIQUE constraint is the authoritative guard; the pre-check
        // above only covers the common case.
        let result = self
            .db()
            .execute_with(
                "INSERT INTO entities (id, tenant_id, blueprint_id, identifier, title, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                || {
                    libsql::params![
                        id.as_str(),
                        ctx.tenant_id(),
                        req.blueprint_id.as_str(),
                        req.identifier.as_str(),
                        req.title.as_deref(),
                        data_text.as_str(),
                        format_timestamp(now),
                        format_timestamp(now)
                    ]
                },
            )
            .await;
        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(already_exists()),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            tenant_id = ctx.tenant_id(),
            blueprint_id = %req.blueprint_id,
            entity_id = %id,
            "entity created"
        );

        Ok(Entity {
            id,
            tenant_id: ctx.tenant_id().to_string(),
            blueprint_id: req.blueprint_id,
            identifier: req.identifier,
            title: req.title,
            data: req.data,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_entity(&self, ctx: &TenantContext, id: &str) -> Result<Entity, StoreError> {
        let sql = format!("SELECT {ENTITY_COLUMNS} FROM entities e WHERE e.tenant_id = ?1 AND e.id = ?2");
        self.db()
            .query_first(&sql, || [ctx.tenant_id(), id], row_to_entity)
            .await?
            .ok_or_else(|| StoreError::EntityNotFound { id: id.to_string() })
    }

    pub async fn get_entity_by_identifier(
        &self,
        ctx: &TenantContext,
        blueprint_id: &str,
        identifier: &str,
    ) -> Result<Entity, StoreError> {
        let sql = format!(
            "SELECT {ENTITY_COLUMNS} FROM entities e
             WHERE e.tenant_id = ?1 AND e.blueprint_id = ?2 AND e.identifier = ?3"
        );
        self.db()
            .query_first(&sql, || [ctx.tenant_id(), blueprint_id, identifier], row_to_entity)
            .await?
            .ok_or_else(|| StoreError::EntityNotFound {
                id: format!("{blueprint_id}/{identifier}"),
            })
    }

    /// Shallow-merge `update.data` into the stored document and validate the
    /// merged result in partial mode against the blueprint's current schema.
    ///
    /// A title-only update does not validate, so it succeeds even when the
    /// stored document has drifted from a changed schema.
    pub async fn update_entity(
        &self,
        ctx: &TenantContext,
        id: &str,
        update: UpdateEntity,
    ) -> Result<Entity, StoreError> {
        let mut entity = self.get_entity(ctx, id).await?;

        if let Some(patch) = update.data {
            let Value::Object(patch) = patch else {
                return Err(StoreError::validation(FieldError::new(
                    "data",
                    "must be a JSON object",
                )));
            };
            shallow_merge(&mut entity.data, patch);

            let schema = self.blueprint_schema(ctx, &entity.blueprint_id).await?;
            self.validator()
                .validate(&entity.data, &schema, ValidationMode::Partial)?;
        }
        if let Some(title) = update.title {
            entity.title = Some(title);
        }

        let now = now_utc();
        let data_text = to_json_text(&entity.data)?;
        let changed = self
            .db()
            .execute_with(
                "UPDATE entities SET title = ?1, data = ?2, updated_at = ?3
                 WHERE tenant_id = ?4 AND id = ?5",
                || {
                    libsql::params![
                        entity.title.as_deref(),
                        data_text.as_str(),
                        format_timestamp(now),
                        ctx.tenant_id(),
                        id
                    ]
                },
            )
            .await?;
        if changed == 0 {
            // Deleted between the read and the write.
            return Err(StoreError::EntityNotFound { id: id.to_string() });
        }
        entity.updated_at = now;

        tracing::info!(tenant_id = ctx.tenant_id(), entity_id = id, "entity updated");
        Ok(entity)
    }

    pub async fn delete_entity(&self, ctx: &TenantContext, id: &str) -> Result<(), StoreError> {
        let changed = self
            .db()
            .execute_with(
                "DELETE FROM entities WHERE tenant_id = ?1 AND id = ?2",
                || [ctx.tenant_id(), id],
            )
            .await?;
        if changed == 0 {
            return Err(StoreError::EntityNotFound { id: id.to_string() });
        }
        tracing::info!(tenant_id = ctx.tenant_id(), entity_id = id, "entity deleted");
        Ok(())
    }

    /// Filtered, ordered, paginated search within one blueprint.
    ///
    /// `total` counts every match regardless of the page window. An unknown
    /// blueprint yields an empty page.
    pub async fn search_entities(
        &self,
        ctx: &TenantContext,
        search: &SearchEntities,
    ) -> Result<SearchPage, StoreError> {
        let compiled = tessera_query::compile(search, self.limits())?;
        // ?1 tenant, ?2 blueprint
        let query = sqlite::render(&compiled, ENTITY_TABLE, 3);

        let scope: [libsql::Value; 2] = [
            ctx.tenant_id().into(),
            search.blueprint_id.as_str().into(),
        ];
        let with_scope = |params: Vec<tessera_query::sqlite::SqlParam>| {
            scope
                .iter()
                .cloned()
                .chain(params.into_iter().map(to_libsql))
                .collect::<Vec<libsql::Value>>()
        };
        let count_params = with_scope(query.count_params());
        let fetch_params = with_scope(query.fetch_params());

        let count_sql = format!(
            "SELECT COUNT(*) FROM entities e
             WHERE e.tenant_id = ?1 AND e.blueprint_id = ?2 AND ({})",
            query.where_sql
        );
        let count = self
            .db()
            .query_first(
                &count_sql,
                || libsql::params_from_iter(count_params.clone()),
                |row| Ok(row.get::<i64>(0)?),
            )
            .await?
            .ok_or(DatabaseError::NoResult)?;
        let total = u64::try_from(count).unwrap_or(0);

        let fetch_sql = format!(
            "SELECT {ENTITY_COLUMNS} FROM entities e
             WHERE e.tenant_id = ?1 AND e.blueprint_id = ?2 AND ({})
             ORDER BY {} {}",
            query.where_sql, query.order_sql, query.page_sql
        );
        let items = self
            .db()
            .query_all(
                &fetch_sql,
                || libsql::params_from_iter(fetch_params.clone()),
                row_to_entity,
            )
            .await?;

        tracing::debug!(
            tenant_id = ctx.tenant_id(),
            blueprint_id = %search.blueprint_id,
            filters = compiled.filters.len(),
            limit = compiled.page.limit,
            offset = compiled.page.offset,
            returned = items.len(),
            total,
            "entity search"
        );

        Ok(SearchPage {
            items,
            total,
            limit: compiled.page.limit,
            offset: compiled.page.offset,
        })
    }
}
