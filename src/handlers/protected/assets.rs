use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::{AssetResponse, CreateAssetRequest, UpdateAssetRequest};
use crate::database::models::{AssetCategory, AssetStatus};
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::asset_service::AssetListParams;
use crate::services::AssetService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub school_id: Option<Uuid>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/assets
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<AssetResponse>> {
    let pool = super::super::pool().await?;
    let page = AssetService::new(pool)
        .list(
            &ctx,
            AssetListParams {
                school_id: query.school_id,
                category: query.category,
                status: query.status,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(ApiResponse::paginated(page.map(AssetResponse::from)))
}

/// POST /api/assets (admin)
pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CreateAssetRequest>,
) -> ApiResult<AssetResponse> {
    let pool = super::super::pool().await?;
    let asset = AssetService::new(pool).create(&ctx, payload).await?;
    Ok(ApiResponse::created(AssetResponse::from(asset)))
}

/// GET /api/assets/:id
pub async fn get(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<AssetResponse> {
    let pool = super::super::pool().await?;
    let asset = AssetService::new(pool).get(&ctx, id).await?;
    Ok(ApiResponse::success(AssetResponse::from(asset)))
}

/// PUT /api/assets/:id (admin)
pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssetRequest>,
) -> ApiResult<AssetResponse> {
    let pool = super::super::pool().await?;
    let asset = AssetService::new(pool).update(&ctx, id, payload).await?;
    Ok(ApiResponse::success(AssetResponse::from(asset)))
}

/// DELETE /api/assets/:id (admin, soft delete)
pub async fn delete(Extension(ctx): Extension<TenantContext>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    AssetService::new(pool).soft_delete(&ctx, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/assets/:id/restore (admin)
pub async fn restore(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<AssetResponse> {
    let pool = super::super::pool().await?;
    let asset = AssetService::new(pool).restore(&ctx, id).await?;
    Ok(ApiResponse::success(AssetResponse::from(asset)))
}
