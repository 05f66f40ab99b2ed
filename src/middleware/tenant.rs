use axum::{extract::Request, middleware::Next, response::Response};
use sqlx::Row;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::UserRole;
use crate::error::ApiError;

use super::auth::AuthUser;

/// Request-scoped tenant context, injected after the company and user in the
/// JWT claims have been validated against the database. Services take this
/// to scope every query.
#[derive(Clone, Debug)]
pub struct TenantContext {
    pub company_id: Uuid,
    pub company_name: String,
    pub user_id: Uuid,
    pub role: UserRole,
}

impl TenantContext {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator role required"))
        }
    }

    pub fn require_root(&self) -> Result<(), ApiError> {
        if self.role == UserRole::Root {
            Ok(())
        } else {
            Err(ApiError::forbidden("Root role required"))
        }
    }
}

/// Middleware validating the claims against live rows: the company must be
/// active and not deleted, and so must the user. Tokens outlive state changes
/// (deactivation, deletion), so this check runs on every protected request.
pub async fn tenant_context_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before tenant validation"))?
        .clone();

    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let query = r#"
        SELECT c.name AS company_name, c.is_active AS company_active, u.is_active AS user_active
        FROM users u
        JOIN companies c ON c.id = u.company_id
        WHERE u.id = $1 AND u.company_id = $2
          AND u.deleted_at IS NULL AND c.deleted_at IS NULL
    "#;

    let row = sqlx::query(query)
        .bind(auth_user.user_id)
        .bind(auth_user.company_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Database error validating tenant context: {}", e);
            ApiError::internal_server_error("Failed to validate tenant")
        })?;

    let row = row.ok_or_else(|| {
        tracing::warn!(
            "Tenant validation failed: user {} / company {} not found",
            auth_user.user_id,
            auth_user.company_id
        );
        ApiError::forbidden("Account no longer exists")
    })?;

    let company_active: bool = row.get("company_active");
    let user_active: bool = row.get("user_active");
    if !company_active {
        return Err(ApiError::forbidden("Company is not active"));
    }
    if !user_active {
        return Err(ApiError::forbidden("User account is disabled"));
    }

    let context = TenantContext {
        company_id: auth_user.company_id,
        company_name: row.get("company_name"),
        user_id: auth_user.user_id,
        role: auth_user.role,
    };

    tracing::debug!("Tenant context resolved: {} ({})", context.company_name, context.company_id);
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Guard for the /api/root surface
pub async fn require_root_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let context = request
        .extensions()
        .get::<TenantContext>()
        .ok_or_else(|| ApiError::unauthorized("Tenant context required"))?;

    context.require_root()?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with_role(role: UserRole) -> TenantContext {
        TenantContext {
            company_id: Uuid::new_v4(),
            company_name: "Test Co".to_string(),
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn admin_guard() {
        assert!(context_with_role(UserRole::Admin).require_admin().is_ok());
        assert!(context_with_role(UserRole::Root).require_admin().is_ok());
        assert!(context_with_role(UserRole::Supervisor).require_admin().is_err());
        assert!(context_with_role(UserRole::Viewer).require_admin().is_err());
    }

    #[test]
    fn root_guard() {
        assert!(context_with_role(UserRole::Root).require_root().is_ok());
        assert!(context_with_role(UserRole::Admin).require_root().is_err());
    }
}
