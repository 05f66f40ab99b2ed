use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::dto::{CreateSchoolRequest, UpdateSchoolRequest};
use crate::database::models::{AuditAction, School};
use crate::database::repository::{Page, TenantRepository};
use crate::filter::FilterData;
use crate::middleware::TenantContext;
use crate::services::{AuditService, ServiceError};
use crate::validation;

#[derive(Debug, Default)]
pub struct SchoolListParams {
    pub city: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

pub struct SchoolService {
    pool: PgPool,
    audit: AuditService,
}

impl SchoolService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    fn repo(&self, ctx: &TenantContext) -> TenantRepository<School> {
        TenantRepository::new("schools", self.pool.clone(), ctx.company_id)
    }

    pub async fn list(&self, ctx: &TenantContext, params: SchoolListParams) -> Result<Page<School>, ServiceError> {
        let mut conditions = json!({});
        if let Some(city) = &params.city {
            conditions["city"] = json!(city);
        }
        if let Some(search) = &params.search {
            let pattern = format!("%{}%", search);
            conditions["$or"] = json!([
                { "name": { "$ilike": pattern } },
                { "name_ar": { "$ilike": pattern } },
                { "code": { "$ilike": pattern } },
            ]);
        }

        let page = self
            .repo(ctx)
            .select_page(FilterData {
                where_clause: Some(conditions),
                order: Some(json!("name asc")),
                limit: params.limit,
                offset: params.offset,
                ..Default::default()
            })
            .await?;
        Ok(page)
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<School, ServiceError> {
        self.repo(ctx)
            .select_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("school", id))
    }

    fn validate_fields(name: &str, name_ar: Option<&str>, code: &str) -> Result<(), ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::field("name", "School name cannot be empty"));
        }
        if let Some(name_ar) = name_ar {
            validation::validate_arabic_text(name_ar).map_err(|e| ServiceError::field("name_ar", e))?;
        }
        if code.trim().is_empty() {
            return Err(ServiceError::field("code", "School code cannot be empty"));
        }
        Ok(())
    }

    pub async fn create(&self, ctx: &TenantContext, request: CreateSchoolRequest) -> Result<School, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;
        Self::validate_fields(&request.name, request.name_ar.as_deref(), &request.code)?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM schools WHERE company_id = $1 AND code = $2 AND deleted_at IS NULL)",
        )
        .bind(ctx.company_id)
        .bind(&request.code)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(ServiceError::Conflict(format!("School code '{}' is already in use", request.code)));
        }

        let school = sqlx::query_as::<_, School>(
            "INSERT INTO schools (company_id, name, name_ar, code, address, city, region, contact_phone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(request.name.trim())
        .bind(request.name_ar)
        .bind(request.code.trim())
        .bind(request.address)
        .bind(request.city)
        .bind(request.region)
        .bind(request.contact_phone)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Create,
                "school",
                Some(school.id),
                json!({ "code": school.code }),
            )
            .await;

        Ok(school)
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        request: UpdateSchoolRequest,
    ) -> Result<School, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(ServiceError::field("name", "School name cannot be empty"));
            }
        }
        if let Some(name_ar) = &request.name_ar {
            validation::validate_arabic_text(name_ar).map_err(|e| ServiceError::field("name_ar", e))?;
        }

        let updated = sqlx::query_as::<_, School>(
            "UPDATE schools SET \
                name = COALESCE($3, name), \
                name_ar = COALESCE($4, name_ar), \
                address = COALESCE($5, address), \
                city = COALESCE($6, city), \
                region = COALESCE($7, region), \
                contact_phone = COALESCE($8, contact_phone), \
                updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(request.name)
        .bind(request.name_ar)
        .bind(request.address)
        .bind(request.city)
        .bind(request.region)
        .bind(request.contact_phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("school", id))?;

        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::Update, "school", Some(id), json!({}))
            .await;

        Ok(updated)
    }

    pub async fn soft_delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).soft_delete(id).await? {
            return Err(ServiceError::not_found("school", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::SoftDelete, "school", Some(id), json!({}))
            .await;
        Ok(())
    }

    pub async fn restore(&self, ctx: &TenantContext, id: Uuid) -> Result<School, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).restore(id).await? {
            return Err(ServiceError::not_found("deleted school", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::Restore, "school", Some(id), json!({}))
            .await;
        self.get(ctx, id).await
    }

    /// Existence check used by services that reference schools
    pub async fn assert_in_tenant(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        self.get(ctx, id).await.map(|_| ())
    }
}
