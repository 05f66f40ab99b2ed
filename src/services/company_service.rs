use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::dto::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::database::models::{AuditAction, Company};
use crate::database::repository::Page;
use crate::middleware::TenantContext;
use crate::services::{AuditService, ServiceError};
use crate::validation;

/// Platform-level tenant management. Unlike the domain services this one is
/// not tenant-scoped: it is reachable only from the root surface and the
/// admin CLI.
pub struct CompanyService {
    pool: PgPool,
    audit: AuditService,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    pub async fn list(
        &self,
        include_deleted: bool,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Page<Company>, ServiceError> {
        let limit = limit
            .unwrap_or(crate::config::config().api.default_page_size as i32)
            .min(crate::config::config().api.max_page_size as i32) as i64;
        let offset = offset.unwrap_or(0) as i64;

        let visibility = if include_deleted { "" } else { "WHERE deleted_at IS NULL" };
        let items = sqlx::query_as::<_, Company>(&format!(
            "SELECT * FROM companies {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            visibility
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM companies {}", visibility))
            .fetch_one(&self.pool)
            .await?;

        Ok(Page { items, total, limit, offset })
    }

    pub async fn get(&self, id: Uuid) -> Result<Company, ServiceError> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("company", id))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Company, ServiceError> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE slug = $1 AND deleted_at IS NULL")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("company '{}' not found", slug)))
    }

    pub async fn create(
        &self,
        actor: Option<&TenantContext>,
        request: CreateCompanyRequest,
    ) -> Result<Company, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::field("name", "Company name cannot be empty"));
        }
        validation::validate_slug(&request.slug).map_err(|e| ServiceError::field("slug", e))?;
        if let Some(email) = &request.contact_email {
            validation::validate_email(email).map_err(|e| ServiceError::field("contact_email", e))?;
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE slug = $1 AND deleted_at IS NULL)")
                .bind(&request.slug)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(ServiceError::Conflict(format!("Slug '{}' is already in use", request.slug)));
        }

        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name, slug, contact_email, contact_phone) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(request.name.trim())
        .bind(&request.slug)
        .bind(request.contact_email)
        .bind(request.contact_phone)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .record(
                Some(company.id),
                actor.map(|a| a.user_id),
                AuditAction::Create,
                "company",
                Some(company.id),
                json!({ "slug": company.slug }),
            )
            .await;

        Ok(company)
    }

    pub async fn update(
        &self,
        actor: &TenantContext,
        id: Uuid,
        request: UpdateCompanyRequest,
    ) -> Result<Company, ServiceError> {
        if let Some(email) = &request.contact_email {
            validation::validate_email(email).map_err(|e| ServiceError::field("contact_email", e))?;
        }

        let updated = sqlx::query_as::<_, Company>(
            "UPDATE companies SET \
                name = COALESCE($2, name), \
                contact_email = COALESCE($3, contact_email), \
                contact_phone = COALESCE($4, contact_phone), \
                is_active = COALESCE($5, is_active), \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(request.name)
        .bind(request.contact_email)
        .bind(request.contact_phone)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("company", id))?;

        self.audit
            .record(
                Some(id),
                Some(actor.user_id),
                AuditAction::Update,
                "company",
                Some(id),
                json!({ "is_active": updated.is_active }),
            )
            .await;

        Ok(updated)
    }

    pub async fn soft_delete(&self, actor: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        if id == actor.company_id {
            return Err(ServiceError::Conflict("Cannot delete your own company".to_string()));
        }

        let result = sqlx::query(
            "UPDATE companies SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("company", id));
        }

        self.audit
            .record(Some(id), Some(actor.user_id), AuditAction::SoftDelete, "company", Some(id), json!({}))
            .await;
        Ok(())
    }

    pub async fn restore(&self, actor: &TenantContext, id: Uuid) -> Result<Company, ServiceError> {
        let result = sqlx::query(
            "UPDATE companies SET deleted_at = NULL, updated_at = NOW() WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("deleted company", id));
        }

        self.audit
            .record(Some(id), Some(actor.user_id), AuditAction::Restore, "company", Some(id), json!({}))
            .await;
        self.get(id).await
    }
}
