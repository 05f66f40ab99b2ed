use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::{CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest};
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::CompanyService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_deleted: bool,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/root/companies
pub async fn list(
    Extension(_ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<CompanyResponse>> {
    let pool = super::super::pool().await?;
    let page = CompanyService::new(pool)
        .list(query.include_deleted, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::paginated(page.map(CompanyResponse::from)))
}

/// POST /api/root/companies - Provision a tenant
pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CreateCompanyRequest>,
) -> ApiResult<CompanyResponse> {
    let pool = super::super::pool().await?;
    let company = CompanyService::new(pool).create(Some(&ctx), payload).await?;
    Ok(ApiResponse::created(CompanyResponse::from(company)))
}

/// GET /api/root/companies/:id
pub async fn get(
    Extension(_ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<CompanyResponse> {
    let pool = super::super::pool().await?;
    let company = CompanyService::new(pool).get(id).await?;
    Ok(ApiResponse::success(CompanyResponse::from(company)))
}

/// PUT /api/root/companies/:id
pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> ApiResult<CompanyResponse> {
    let pool = super::super::pool().await?;
    let company = CompanyService::new(pool).update(&ctx, id, payload).await?;
    Ok(ApiResponse::success(CompanyResponse::from(company)))
}

/// DELETE /api/root/companies/:id - Soft delete a tenant
pub async fn delete(Extension(ctx): Extension<TenantContext>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    CompanyService::new(pool).soft_delete(&ctx, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/root/companies/:id/restore
pub async fn restore(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<CompanyResponse> {
    let pool = super::super::pool().await?;
    let company = CompanyService::new(pool).restore(&ctx, id).await?;
    Ok(ApiResponse::success(CompanyResponse::from(company)))
}
