use axum::extract::Extension;

use crate::api::dto::DashboardStats;
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::StatsService;

/// GET /api/stats - Dashboard aggregates for the company
pub async fn dashboard(Extension(ctx): Extension<TenantContext>) -> ApiResult<DashboardStats> {
    let pool = super::super::pool().await?;
    let stats = StatsService::new(pool).dashboard(&ctx).await?;
    Ok(ApiResponse::success(stats))
}
