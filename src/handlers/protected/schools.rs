use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::{CreateSchoolRequest, SchoolResponse, UpdateSchoolRequest};
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::school_service::SchoolListParams;
use crate::services::SchoolService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub city: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/schools
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<SchoolResponse>> {
    let pool = super::super::pool().await?;
    let page = SchoolService::new(pool)
        .list(
            &ctx,
            SchoolListParams {
                city: query.city,
                search: query.search,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(ApiResponse::paginated(page.map(SchoolResponse::from)))
}

/// POST /api/schools (admin)
pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CreateSchoolRequest>,
) -> ApiResult<SchoolResponse> {
    let pool = super::super::pool().await?;
    let school = SchoolService::new(pool).create(&ctx, payload).await?;
    Ok(ApiResponse::created(SchoolResponse::from(school)))
}

/// GET /api/schools/:id
pub async fn get(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<SchoolResponse> {
    let pool = super::super::pool().await?;
    let school = SchoolService::new(pool).get(&ctx, id).await?;
    Ok(ApiResponse::success(SchoolResponse::from(school)))
}

/// PUT /api/schools/:id (admin)
pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSchoolRequest>,
) -> ApiResult<SchoolResponse> {
    let pool = super::super::pool().await?;
    let school = SchoolService::new(pool).update(&ctx, id, payload).await?;
    Ok(ApiResponse::success(SchoolResponse::from(school)))
}

/// DELETE /api/schools/:id (admin, soft delete)
pub async fn delete(Extension(ctx): Extension<TenantContext>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    SchoolService::new(pool).soft_delete(&ctx, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/schools/:id/restore (admin)
pub async fn restore(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<SchoolResponse> {
    let pool = super::super::pool().await?;
    let school = SchoolService::new(pool).restore(&ctx, id).await?;
    Ok(ApiResponse::success(SchoolResponse::from(school)))
}
