use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::{
    ConvertReportRequest, CreateReportRequest, ReportResponse, ReportStatusRequest, UpdateReportRequest,
    WorkOrderResponse,
};
use crate::database::models::ReportStatus;
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::report_service::ReportListParams;
use crate::services::ReportService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub school_id: Option<Uuid>,
    pub status: Option<ReportStatus>,
    pub reported_by: Option<Uuid>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/reports
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<ReportResponse>> {
    let pool = super::super::pool().await?;
    let page = ReportService::new(pool)
        .list(
            &ctx,
            ReportListParams {
                school_id: query.school_id,
                status: query.status,
                reported_by: query.reported_by,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(ApiResponse::paginated(page.map(ReportResponse::from)))
}

/// POST /api/reports - Raise a maintenance report
pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CreateReportRequest>,
) -> ApiResult<ReportResponse> {
    let pool = super::super::pool().await?;
    let report = ReportService::new(pool).create(&ctx, payload).await?;
    Ok(ApiResponse::created(ReportResponse::from(report)))
}

/// GET /api/reports/:id
pub async fn get(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<ReportResponse> {
    let pool = super::super::pool().await?;
    let report = ReportService::new(pool).get(&ctx, id).await?;
    Ok(ApiResponse::success(ReportResponse::from(report)))
}

/// PUT /api/reports/:id - Edit while still open
pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReportRequest>,
) -> ApiResult<ReportResponse> {
    let pool = super::super::pool().await?;
    let report = ReportService::new(pool).update(&ctx, id, payload).await?;
    Ok(ApiResponse::success(ReportResponse::from(report)))
}

/// DELETE /api/reports/:id (admin, soft delete)
pub async fn delete(Extension(ctx): Extension<TenantContext>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    ReportService::new(pool).soft_delete(&ctx, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/reports/:id/status - Lifecycle transition (admin)
pub async fn transition(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReportStatusRequest>,
) -> ApiResult<ReportResponse> {
    let pool = super::super::pool().await?;
    let report = ReportService::new(pool).transition(&ctx, id, payload.status).await?;
    Ok(ApiResponse::success(ReportResponse::from(report)))
}

/// POST /api/reports/:id/work-order - Convert to a work order
pub async fn convert(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConvertReportRequest>,
) -> ApiResult<WorkOrderResponse> {
    let pool = super::super::pool().await?;
    let work_order = ReportService::new(pool).convert_to_work_order(&ctx, id, payload).await?;
    Ok(ApiResponse::created(WorkOrderResponse::from(work_order)))
}
