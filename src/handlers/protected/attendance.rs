use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::dto::{AttendanceResponse, CheckInRequest, CheckOutRequest};
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::attendance_service::AttendanceListParams;
use crate::services::AttendanceService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Admins may inspect any user; others are pinned to themselves
    pub user_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
    #[serde(default)]
    pub open_only: bool,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/attendance
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<AttendanceResponse>> {
    let pool = super::super::pool().await?;
    let page = AttendanceService::new(pool)
        .list(
            &ctx,
            AttendanceListParams {
                user_id: query.user_id,
                school_id: query.school_id,
                open_only: query.open_only,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(ApiResponse::paginated(page.map(AttendanceResponse::from)))
}

/// POST /api/attendance/check-in
pub async fn check_in(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CheckInRequest>,
) -> ApiResult<AttendanceResponse> {
    let pool = super::super::pool().await?;
    let attendance = AttendanceService::new(pool).check_in(&ctx, payload).await?;
    Ok(ApiResponse::created(AttendanceResponse::from(attendance)))
}

/// POST /api/attendance/check-out
pub async fn check_out(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CheckOutRequest>,
) -> ApiResult<AttendanceResponse> {
    let pool = super::super::pool().await?;
    let attendance = AttendanceService::new(pool).check_out(&ctx, payload.notes).await?;
    Ok(ApiResponse::success(AttendanceResponse::from(attendance)))
}
