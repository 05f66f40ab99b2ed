use axum::{http::HeaderMap, Json};

use crate::api::dto::{LoginRequest, TokenResponse, UserResponse};
use crate::error::ApiError;
use crate::middleware::auth::extract_bearer_token;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AuthService;

/// POST /auth/login - Authenticate against a company slug and receive a JWT
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<TokenResponse> {
    if payload.company.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ApiError::bad_request("company and email are required"));
    }

    let pool = super::super::pool().await?;
    let (user, token) = AuthService::new(pool).login(&payload).await?;

    Ok(ApiResponse::success(TokenResponse {
        token,
        expires_in: crate::config::config().security.jwt_expiry_hours as i64 * 3600,
        user: UserResponse::from(user),
    }))
}

/// POST /auth/refresh - Trade a still-valid (or recently expired) token for
/// a fresh one. The old token goes in the Authorization header.
pub async fn refresh(headers: HeaderMap) -> ApiResult<TokenResponse> {
    let token = extract_bearer_token(&headers)?;

    let pool = super::super::pool().await?;
    let (user, token) = AuthService::new(pool).refresh(&token).await?;

    Ok(ApiResponse::success(TokenResponse {
        token,
        expires_in: crate::config::config().security.jwt_expiry_hours as i64 * 3600,
        user: UserResponse::from(user),
    }))
}
