use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::{
    AssignWorkOrderRequest, CreateWorkOrderRequest, UpdateWorkOrderRequest, WorkOrderResponse,
    WorkOrderStatusRequest,
};
use crate::database::models::WorkOrderStatus;
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::work_order_service::WorkOrderListParams;
use crate::services::WorkOrderService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub school_id: Option<Uuid>,
    pub status: Option<WorkOrderStatus>,
    pub assigned_to: Option<Uuid>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/work-orders
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<WorkOrderResponse>> {
    let pool = super::super::pool().await?;
    let page = WorkOrderService::new(pool)
        .list(
            &ctx,
            WorkOrderListParams {
                school_id: query.school_id,
                status: query.status,
                assigned_to: query.assigned_to,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(ApiResponse::paginated(page.map(WorkOrderResponse::from)))
}

/// POST /api/work-orders (supervisor)
pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CreateWorkOrderRequest>,
) -> ApiResult<WorkOrderResponse> {
    let pool = super::super::pool().await?;
    let work_order = WorkOrderService::new(pool).create(&ctx, payload).await?;
    Ok(ApiResponse::created(WorkOrderResponse::from(work_order)))
}

/// GET /api/work-orders/:id
pub async fn get(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<WorkOrderResponse> {
    let pool = super::super::pool().await?;
    let work_order = WorkOrderService::new(pool).get(&ctx, id).await?;
    Ok(ApiResponse::success(WorkOrderResponse::from(work_order)))
}

/// PUT /api/work-orders/:id (supervisor)
pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkOrderRequest>,
) -> ApiResult<WorkOrderResponse> {
    let pool = super::super::pool().await?;
    let work_order = WorkOrderService::new(pool).update(&ctx, id, payload).await?;
    Ok(ApiResponse::success(WorkOrderResponse::from(work_order)))
}

/// DELETE /api/work-orders/:id (admin, soft delete)
pub async fn delete(Extension(ctx): Extension<TenantContext>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    WorkOrderService::new(pool).soft_delete(&ctx, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/work-orders/:id/restore (admin)
pub async fn restore(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<WorkOrderResponse> {
    let pool = super::super::pool().await?;
    let work_order = WorkOrderService::new(pool).restore(&ctx, id).await?;
    Ok(ApiResponse::success(WorkOrderResponse::from(work_order)))
}

/// POST /api/work-orders/:id/assign (supervisor)
pub async fn assign(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignWorkOrderRequest>,
) -> ApiResult<WorkOrderResponse> {
    let pool = super::super::pool().await?;
    let work_order = WorkOrderService::new(pool).assign(&ctx, id, payload.user_id).await?;
    Ok(ApiResponse::success(WorkOrderResponse::from(work_order)))
}

/// POST /api/work-orders/:id/status - Lifecycle transition
pub async fn transition(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkOrderStatusRequest>,
) -> ApiResult<WorkOrderResponse> {
    let pool = super::super::pool().await?;
    let work_order = WorkOrderService::new(pool)
        .transition(&ctx, id, payload.status, payload.completion_notes)
        .await?;
    Ok(ApiResponse::success(WorkOrderResponse::from(work_order)))
}
