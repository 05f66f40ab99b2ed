use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::dto::{CreateAssetRequest, UpdateAssetRequest};
use crate::database::models::{Asset, AssetCategory, AssetStatus, AuditAction};
use crate::database::repository::{Page, TenantRepository};
use crate::middleware::TenantContext;
use crate::services::{AuditService, SchoolService, ServiceError};

#[derive(Debug, Default)]
pub struct AssetListParams {
    pub school_id: Option<Uuid>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

pub struct AssetService {
    pool: PgPool,
    audit: AuditService,
}

impl AssetService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    fn repo(&self, ctx: &TenantContext) -> TenantRepository<Asset> {
        TenantRepository::new("assets", self.pool.clone(), ctx.company_id)
    }

    /// Listing goes through a typed query: category/status are Postgres
    /// enums, which the JSON filter language cannot bind.
    pub async fn list(&self, ctx: &TenantContext, params: AssetListParams) -> Result<Page<Asset>, ServiceError> {
        let limit = params
            .limit
            .unwrap_or(crate::config::config().api.default_page_size as i32)
            .min(crate::config::config().api.max_page_size as i32) as i64;
        let offset = params.offset.unwrap_or(0) as i64;

        let mut conditions = String::from("company_id = $1 AND deleted_at IS NULL");
        let mut n = 1;
        if params.school_id.is_some() {
            n += 1;
            conditions.push_str(&format!(" AND school_id = ${}", n));
        }
        if params.category.is_some() {
            n += 1;
            conditions.push_str(&format!(" AND category = ${}", n));
        }
        if params.status.is_some() {
            n += 1;
            conditions.push_str(&format!(" AND status = ${}", n));
        }

        let list_sql = format!(
            "SELECT * FROM assets WHERE {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            n + 1,
            n + 2
        );
        let count_sql = format!("SELECT COUNT(*) FROM assets WHERE {}", conditions);

        let mut list_query = sqlx::query_as::<_, Asset>(&list_sql).bind(ctx.company_id);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(ctx.company_id);
        if let Some(school_id) = params.school_id {
            list_query = list_query.bind(school_id);
            count_query = count_query.bind(school_id);
        }
        if let Some(category) = params.category {
            list_query = list_query.bind(category);
            count_query = count_query.bind(category);
        }
        if let Some(status) = params.status {
            list_query = list_query.bind(status);
            count_query = count_query.bind(status);
        }

        let items = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok(Page { items, total, limit, offset })
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<Asset, ServiceError> {
        self.repo(ctx)
            .select_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("asset", id))
    }

    pub async fn create(&self, ctx: &TenantContext, request: CreateAssetRequest) -> Result<Asset, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if request.name.trim().is_empty() {
            return Err(ServiceError::field("name", "Asset name cannot be empty"));
        }
        if request.asset_tag.trim().is_empty() {
            return Err(ServiceError::field("asset_tag", "Asset tag cannot be empty"));
        }
        SchoolService::new(self.pool.clone())
            .assert_in_tenant(ctx, request.school_id)
            .await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE company_id = $1 AND asset_tag = $2 AND deleted_at IS NULL)",
        )
        .bind(ctx.company_id)
        .bind(&request.asset_tag)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(ServiceError::Conflict(format!("Asset tag '{}' is already in use", request.asset_tag)));
        }

        let asset = sqlx::query_as::<_, Asset>(
            "INSERT INTO assets (company_id, school_id, name, asset_tag, category, status, manufacturer, \
                                 model, serial_number, purchase_cost, purchase_date, warranty_until, location_note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(request.school_id)
        .bind(request.name.trim())
        .bind(request.asset_tag.trim())
        .bind(request.category)
        .bind(request.status.unwrap_or(AssetStatus::Operational))
        .bind(request.manufacturer)
        .bind(request.model)
        .bind(request.serial_number)
        .bind(request.purchase_cost)
        .bind(request.purchase_date)
        .bind(request.warranty_until)
        .bind(request.location_note)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Create,
                "asset",
                Some(asset.id),
                json!({ "asset_tag": asset.asset_tag, "school_id": asset.school_id }),
            )
            .await;

        Ok(asset)
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        request: UpdateAssetRequest,
    ) -> Result<Asset, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        let updated = sqlx::query_as::<_, Asset>(
            "UPDATE assets SET \
                name = COALESCE($3, name), \
                status = COALESCE($4, status), \
                manufacturer = COALESCE($5, manufacturer), \
                model = COALESCE($6, model), \
                serial_number = COALESCE($7, serial_number), \
                purchase_cost = COALESCE($8, purchase_cost), \
                purchase_date = COALESCE($9, purchase_date), \
                warranty_until = COALESCE($10, warranty_until), \
                location_note = COALESCE($11, location_note), \
                updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(request.name)
        .bind(request.status)
        .bind(request.manufacturer)
        .bind(request.model)
        .bind(request.serial_number)
        .bind(request.purchase_cost)
        .bind(request.purchase_date)
        .bind(request.warranty_until)
        .bind(request.location_note)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("asset", id))?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Update,
                "asset",
                Some(id),
                json!({ "status": updated.status }),
            )
            .await;

        Ok(updated)
    }

    pub async fn soft_delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).soft_delete(id).await? {
            return Err(ServiceError::not_found("asset", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::SoftDelete, "asset", Some(id), json!({}))
            .await;
        Ok(())
    }

    pub async fn restore(&self, ctx: &TenantContext, id: Uuid) -> Result<Asset, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).restore(id).await? {
            return Err(ServiceError::not_found("deleted asset", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::Restore, "asset", Some(id), json!({}))
            .await;
        self.get(ctx, id).await
    }

    pub async fn assert_in_tenant(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        self.get(ctx, id).await.map(|_| ())
    }
}
