use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::api::dto::ChangePasswordRequest;
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::UserService;

/// GET /api/auth/whoami - Current authenticated identity
pub async fn whoami(Extension(ctx): Extension<TenantContext>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user_id": ctx.user_id,
        "company_id": ctx.company_id,
        "company_name": ctx.company_name,
        "role": ctx.role,
    })))
}

/// PUT /api/auth/password - Change the calling user's password
pub async fn change_password(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    UserService::new(pool)
        .change_password(&ctx, &payload.current_password, &payload.new_password)
        .await?;
    Ok(ApiResponse::success(json!({ "changed": true })))
}
