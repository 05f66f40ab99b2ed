use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::database::models::UserRole;
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::user_service::UserListParams;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/users - List users in the company
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<UserResponse>> {
    let pool = super::super::pool().await?;
    let page = UserService::new(pool)
        .list(
            &ctx,
            UserListParams {
                role: query.role,
                search: query.search,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(ApiResponse::paginated(page.map(UserResponse::from)))
}

/// POST /api/users - Create a user (admin)
pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<UserResponse> {
    let pool = super::super::pool().await?;
    let user = UserService::new(pool).create(&ctx, payload).await?;
    Ok(ApiResponse::created(UserResponse::from(user)))
}

/// GET /api/users/:id
pub async fn get(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserResponse> {
    let pool = super::super::pool().await?;
    let user = UserService::new(pool).get(&ctx, id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// PUT /api/users/:id - Update profile/role/active flag (admin)
pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    let pool = super::super::pool().await?;
    let user = UserService::new(pool).update(&ctx, id, payload).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// DELETE /api/users/:id - Soft delete (admin)
pub async fn delete(Extension(ctx): Extension<TenantContext>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = super::super::pool().await?;
    UserService::new(pool).soft_delete(&ctx, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/users/:id/restore - Undo a soft delete (admin)
pub async fn restore(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserResponse> {
    let pool = super::super::pool().await?;
    let user = UserService::new(pool).restore(&ctx, id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
