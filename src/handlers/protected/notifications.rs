use axum::{
    extract::{Extension, Path, Query},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::NotificationResponse;
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::NotificationService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/notifications - The calling user's notifications
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<NotificationResponse>> {
    let pool = super::super::pool().await?;
    let page = NotificationService::new(pool)
        .list(&ctx, query.unread_only, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::paginated(page.map(NotificationResponse::from)))
}

/// POST /api/notifications/:id/read
pub async fn mark_read(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<NotificationResponse> {
    let pool = super::super::pool().await?;
    let notification = NotificationService::new(pool).mark_read(&ctx, id).await?;
    Ok(ApiResponse::success(NotificationResponse::from(notification)))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(Extension(ctx): Extension<TenantContext>) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    let marked = NotificationService::new(pool).mark_all_read(&ctx).await?;
    Ok(ApiResponse::success(json!({ "marked": marked })))
}
