use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::dto::CheckInRequest;
use crate::database::models::{Attendance, AuditAction};
use crate::database::repository::{Page, TenantRepository};
use crate::middleware::TenantContext;
use crate::services::{AuditService, SchoolService, ServiceError};
use crate::validation;

#[derive(Debug, Default)]
pub struct AttendanceListParams {
    pub user_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
    pub open_only: bool,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

pub struct AttendanceService {
    pool: PgPool,
    audit: AuditService,
}

impl AttendanceService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    fn repo(&self, ctx: &TenantContext) -> TenantRepository<Attendance> {
        TenantRepository::new("attendance", self.pool.clone(), ctx.company_id)
    }

    /// Open a site visit. A user can have at most one open attendance row.
    pub async fn check_in(&self, ctx: &TenantContext, request: CheckInRequest) -> Result<Attendance, ServiceError> {
        SchoolService::new(self.pool.clone())
            .assert_in_tenant(ctx, request.school_id)
            .await?;

        let vehicle_plate = match request.vehicle_plate.as_deref() {
            Some(plate) => {
                Some(validation::validate_plate_number(plate).map_err(|e| ServiceError::field("vehicle_plate", e))?)
            }
            None => None,
        };

        let open_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM attendance \
             WHERE company_id = $1 AND user_id = $2 AND checked_out_at IS NULL AND deleted_at IS NULL)",
        )
        .bind(ctx.company_id)
        .bind(ctx.user_id)
        .fetch_one(&self.pool)
        .await?;
        if open_exists {
            return Err(ServiceError::Conflict("Already checked in; check out first".to_string()));
        }

        let attendance = sqlx::query_as::<_, Attendance>(
            "INSERT INTO attendance (company_id, user_id, school_id, checked_in_at, vehicle_plate, notes) \
             VALUES ($1, $2, $3, NOW(), $4, $5) RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(ctx.user_id)
        .bind(request.school_id)
        .bind(vehicle_plate)
        .bind(request.notes)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::CheckIn,
                "attendance",
                Some(attendance.id),
                json!({ "school_id": request.school_id }),
            )
            .await;

        Ok(attendance)
    }

    /// Close the caller's open visit. The check-out timestamp is server-side
    /// so it is always strictly after check-in.
    pub async fn check_out(&self, ctx: &TenantContext, notes: Option<String>) -> Result<Attendance, ServiceError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            "UPDATE attendance SET checked_out_at = NOW(), \
                notes = COALESCE($3, notes), \
                updated_at = NOW() \
             WHERE id = (SELECT id FROM attendance \
                         WHERE company_id = $1 AND user_id = $2 AND checked_out_at IS NULL AND deleted_at IS NULL \
                         ORDER BY checked_in_at DESC LIMIT 1) \
             RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(ctx.user_id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::Conflict("No open attendance to check out from".to_string()))?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::CheckOut,
                "attendance",
                Some(attendance.id),
                json!({ "school_id": attendance.school_id }),
            )
            .await;

        Ok(attendance)
    }

    /// Non-admins can only see their own rows
    pub async fn list(
        &self,
        ctx: &TenantContext,
        mut params: AttendanceListParams,
    ) -> Result<Page<Attendance>, ServiceError> {
        if !ctx.role.is_admin() {
            params.user_id = Some(ctx.user_id);
        }

        let mut conditions = json!({});
        if let Some(user_id) = params.user_id {
            conditions["user_id"] = json!(user_id.to_string());
        }
        if let Some(school_id) = params.school_id {
            conditions["school_id"] = json!(school_id.to_string());
        }
        if params.open_only {
            conditions["checked_out_at"] = json!({ "$null": true });
        }

        let page = self
            .repo(ctx)
            .select_page(crate::filter::FilterData {
                where_clause: Some(conditions),
                order: Some(json!("checked_in_at desc")),
                limit: params.limit,
                offset: params.offset,
                ..Default::default()
            })
            .await?;
        Ok(page)
    }
}
