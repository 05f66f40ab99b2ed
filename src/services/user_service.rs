use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::dto::{CreateUserRequest, UpdateUserRequest};
use crate::auth;
use crate::database::models::{AuditAction, User, UserRole};
use crate::database::repository::{Page, TenantRepository};
use crate::filter::FilterData;
use crate::middleware::TenantContext;
use crate::services::{AuditService, ServiceError};
use crate::validation;

#[derive(Debug, Default)]
pub struct UserListParams {
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

pub struct UserService {
    pool: PgPool,
    audit: AuditService,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    fn repo(&self, ctx: &TenantContext) -> TenantRepository<User> {
        TenantRepository::new("users", self.pool.clone(), ctx.company_id)
    }

    pub async fn list(&self, ctx: &TenantContext, params: UserListParams) -> Result<Page<User>, ServiceError> {
        let mut conditions = json!({});
        if let Some(role) = params.role {
            // Enum comparison goes through a typed query, not the filter language
            return self.list_by_role(ctx, role, params).await;
        }
        if let Some(search) = &params.search {
            conditions["$or"] = json!([
                { "email": { "$ilike": format!("%{}%", search) } },
                { "display_name": { "$ilike": format!("%{}%", search) } },
            ]);
        }

        let page = self
            .repo(ctx)
            .select_page(FilterData {
                where_clause: Some(conditions),
                order: Some(json!("created_at desc")),
                limit: params.limit,
                offset: params.offset,
                ..Default::default()
            })
            .await?;
        Ok(page)
    }

    async fn list_by_role(
        &self,
        ctx: &TenantContext,
        role: UserRole,
        params: UserListParams,
    ) -> Result<Page<User>, ServiceError> {
        let limit = params
            .limit
            .unwrap_or(crate::config::config().api.default_page_size as i32)
            .min(crate::config::config().api.max_page_size as i32) as i64;
        let offset = params.offset.unwrap_or(0) as i64;

        let items = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE company_id = $1 AND role = $2 AND deleted_at IS NULL \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(ctx.company_id)
        .bind(role)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE company_id = $1 AND role = $2 AND deleted_at IS NULL",
        )
        .bind(ctx.company_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { items, total, limit, offset })
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<User, ServiceError> {
        self.repo(ctx)
            .select_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    pub async fn create(&self, ctx: &TenantContext, request: CreateUserRequest) -> Result<User, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        validation::validate_email(&request.email).map_err(|e| ServiceError::field("email", e))?;
        validation::validate_strong_password(&request.password)
            .map_err(|e| ServiceError::field("password", e))?;
        if request.display_name.trim().is_empty() {
            return Err(ServiceError::field("display_name", "Display name cannot be empty"));
        }
        // Only root can mint other root accounts
        if request.role == UserRole::Root && ctx.role != UserRole::Root {
            return Err(ServiceError::Forbidden("Only root can create root users".to_string()));
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE company_id = $1 AND lower(email) = lower($2) AND deleted_at IS NULL)",
        )
        .bind(ctx.company_id)
        .bind(&request.email)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(ServiceError::Conflict(format!("Email {} is already in use", request.email)));
        }

        let password_hash = auth::hash_password(&request.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (company_id, email, password_hash, display_name, phone, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(request.email.to_lowercase())
        .bind(password_hash)
        .bind(request.display_name.trim())
        .bind(request.phone)
        .bind(request.role)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Create,
                "user",
                Some(user.id),
                json!({ "email": user.email, "role": user.role }),
            )
            .await;

        Ok(user)
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<User, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if request.role == Some(UserRole::Root) && ctx.role != UserRole::Root {
            return Err(ServiceError::Forbidden("Only root can grant the root role".to_string()));
        }

        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET \
                display_name = COALESCE($3, display_name), \
                phone = COALESCE($4, phone), \
                role = COALESCE($5, role), \
                is_active = COALESCE($6, is_active), \
                updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(request.display_name)
        .bind(request.phone)
        .bind(request.role)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("user", id))?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Update,
                "user",
                Some(id),
                json!({ "role": updated.role, "is_active": updated.is_active }),
            )
            .await;

        Ok(updated)
    }

    pub async fn soft_delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;
        if id == ctx.user_id {
            return Err(ServiceError::Conflict("Cannot delete your own account".to_string()));
        }

        if !self.repo(ctx).soft_delete(id).await? {
            return Err(ServiceError::not_found("user", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::SoftDelete, "user", Some(id), json!({}))
            .await;
        Ok(())
    }

    pub async fn restore(&self, ctx: &TenantContext, id: Uuid) -> Result<User, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).restore(id).await? {
            return Err(ServiceError::not_found("deleted user", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::Restore, "user", Some(id), json!({}))
            .await;
        self.get(ctx, id).await
    }

    /// Change the calling user's own password
    pub async fn change_password(
        &self,
        ctx: &TenantContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let user = self.get(ctx, ctx.user_id).await?;

        if !auth::verify_password(current_password, &user.password_hash) {
            return Err(ServiceError::Unauthorized("Current password is incorrect".to_string()));
        }
        validation::validate_strong_password(new_password)
            .map_err(|e| ServiceError::field("new_password", e))?;

        let password_hash = auth::hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = $3, updated_at = NOW() WHERE id = $1 AND company_id = $2")
            .bind(ctx.user_id)
            .bind(ctx.company_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Update,
                "user",
                Some(ctx.user_id),
                json!({ "password_changed": true }),
            )
            .await;
        Ok(())
    }

    /// Admins of a company, for fan-out notifications
    pub async fn company_admins(&self, company_id: Uuid) -> Result<Vec<User>, ServiceError> {
        let admins = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE company_id = $1 AND role = $2 AND is_active AND deleted_at IS NULL",
        )
        .bind(company_id)
        .bind(UserRole::Admin)
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
    }
}
