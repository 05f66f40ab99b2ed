use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::dto::{ConvertReportRequest, CreateReportRequest, UpdateReportRequest};
use crate::database::models::{
    AuditAction, NotificationKind, Report, ReportStatus, WorkOrder, WorkOrderPriority, WorkOrderStatus,
};
use crate::database::repository::{Page, TenantRepository};
use crate::middleware::TenantContext;
use crate::services::{AssetService, AuditService, NotificationService, SchoolService, ServiceError, UserService};

#[derive(Debug, Default)]
pub struct ReportListParams {
    pub school_id: Option<Uuid>,
    pub status: Option<ReportStatus>,
    pub reported_by: Option<Uuid>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

pub struct ReportService {
    pool: PgPool,
    audit: AuditService,
    notifications: NotificationService,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        let notifications = NotificationService::new(pool.clone());
        Self { pool, audit, notifications }
    }

    fn repo(&self, ctx: &TenantContext) -> TenantRepository<Report> {
        TenantRepository::new("reports", self.pool.clone(), ctx.company_id)
    }

    pub async fn list(&self, ctx: &TenantContext, params: ReportListParams) -> Result<Page<Report>, ServiceError> {
        let limit = params
            .limit
            .unwrap_or(crate::config::config().api.default_page_size as i32)
            .min(crate::config::config().api.max_page_size as i32) as i64;
        let offset = params.offset.unwrap_or(0) as i64;

        let mut conditions = String::from("company_id = $1 AND deleted_at IS NULL");
        let mut n = 1;
        if params.school_id.is_some() {
            n += 1;
            conditions.push_str(&format!(" AND school_id = ${}", n));
        }
        if params.status.is_some() {
            n += 1;
            conditions.push_str(&format!(" AND status = ${}", n));
        }
        if params.reported_by.is_some() {
            n += 1;
            conditions.push_str(&format!(" AND reported_by = ${}", n));
        }

        let list_sql = format!(
            "SELECT * FROM reports WHERE {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            n + 1,
            n + 2
        );
        let count_sql = format!("SELECT COUNT(*) FROM reports WHERE {}", conditions);

        let mut list_query = sqlx::query_as::<_, Report>(&list_sql).bind(ctx.company_id);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(ctx.company_id);
        if let Some(school_id) = params.school_id {
            list_query = list_query.bind(school_id);
            count_query = count_query.bind(school_id);
        }
        if let Some(status) = params.status {
            list_query = list_query.bind(status);
            count_query = count_query.bind(status);
        }
        if let Some(reported_by) = params.reported_by {
            list_query = list_query.bind(reported_by);
            count_query = count_query.bind(reported_by);
        }

        let items = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok(Page { items, total, limit, offset })
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<Report, ServiceError> {
        self.repo(ctx)
            .select_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("report", id))
    }

    /// Any authenticated role may raise a report
    pub async fn create(&self, ctx: &TenantContext, request: CreateReportRequest) -> Result<Report, ServiceError> {
        if request.title.trim().is_empty() {
            return Err(ServiceError::field("title", "Title cannot be empty"));
        }
        if request.description.trim().is_empty() {
            return Err(ServiceError::field("description", "Description cannot be empty"));
        }
        SchoolService::new(self.pool.clone())
            .assert_in_tenant(ctx, request.school_id)
            .await?;
        if let Some(asset_id) = request.asset_id {
            AssetService::new(self.pool.clone()).assert_in_tenant(ctx, asset_id).await?;
        }

        let report = sqlx::query_as::<_, Report>(
            "INSERT INTO reports (company_id, school_id, asset_id, reported_by, title, description, priority) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(request.school_id)
        .bind(request.asset_id)
        .bind(ctx.user_id)
        .bind(request.title.trim())
        .bind(request.description.trim())
        .bind(request.priority)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Create,
                "report",
                Some(report.id),
                json!({ "school_id": report.school_id, "priority": report.priority }),
            )
            .await;

        // Company admins hear about new reports
        let admins = UserService::new(self.pool.clone()).company_admins(ctx.company_id).await?;
        for admin in admins {
            let _ = self
                .notifications
                .notify(
                    ctx.company_id,
                    admin.id,
                    NotificationKind::ReportSubmitted,
                    format!("New maintenance report: {}", report.title),
                    format!("Priority {:?} report submitted", report.priority),
                    Some(("report", report.id)),
                )
                .await;
        }

        Ok(report)
    }

    /// Content updates are only possible while the report is still open
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        request: UpdateReportRequest,
    ) -> Result<Report, ServiceError> {
        let report = self.get(ctx, id).await?;
        if report.status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "Report is {} and can no longer be edited",
                report.status.as_str()
            )));
        }
        // Reporters may edit their own; otherwise admin required
        if report.reported_by != ctx.user_id {
            ctx.require_admin()
                .map_err(|_| ServiceError::Forbidden("Only the reporter or an administrator can edit".to_string()))?;
        }

        let updated = sqlx::query_as::<_, Report>(
            "UPDATE reports SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                priority = COALESCE($5, priority), \
                updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.priority)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("report", id))?;

        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::Update, "report", Some(id), json!({}))
            .await;

        Ok(updated)
    }

    /// Move the report along its lifecycle; invalid edges are a conflict
    pub async fn transition(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        next: ReportStatus,
    ) -> Result<Report, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        let report = self.get(ctx, id).await?;
        if !report.status.can_transition_to(next) {
            return Err(ServiceError::Conflict(format!(
                "Cannot move report from {} to {}",
                report.status.as_str(),
                next.as_str()
            )));
        }

        let resolved = next.is_terminal();
        let updated = sqlx::query_as::<_, Report>(
            "UPDATE reports SET status = $3, \
                resolved_at = CASE WHEN $4 THEN NOW() ELSE resolved_at END, \
                updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(next)
        .bind(resolved)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("report", id))?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::StatusChange,
                "report",
                Some(id),
                json!({ "from": report.status.as_str(), "to": next.as_str() }),
            )
            .await;

        let _ = self
            .notifications
            .notify(
                ctx.company_id,
                updated.reported_by,
                NotificationKind::ReportStatusChanged,
                format!("Report '{}' is now {}", updated.title, next.as_str()),
                format!("Status changed from {} to {}", report.status.as_str(), next.as_str()),
                Some(("report", id)),
            )
            .await;

        Ok(updated)
    }

    pub async fn soft_delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).soft_delete(id).await? {
            return Err(ServiceError::not_found("report", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::SoftDelete, "report", Some(id), json!({}))
            .await;
        Ok(())
    }

    /// Convert a report into a work order atomically: the work order is
    /// created and the report marked converted in one transaction.
    pub async fn convert_to_work_order(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        request: ConvertReportRequest,
    ) -> Result<WorkOrder, ServiceError> {
        if !ctx.role.can_assign_work() {
            return Err(ServiceError::Forbidden("Supervisor role required".to_string()));
        }

        let report = self.get(ctx, id).await?;
        if !report.status.can_transition_to(ReportStatus::Converted) {
            return Err(ServiceError::Conflict(format!(
                "Report is {} and cannot be converted",
                report.status.as_str()
            )));
        }

        if let Some(assignee) = request.assigned_to {
            UserService::new(self.pool.clone()).get(ctx, assignee).await?;
        }

        let priority = request.priority.unwrap_or(match report.priority {
            crate::database::models::ReportPriority::Low => WorkOrderPriority::Low,
            crate::database::models::ReportPriority::Medium => WorkOrderPriority::Medium,
            crate::database::models::ReportPriority::High => WorkOrderPriority::High,
            crate::database::models::ReportPriority::Critical => WorkOrderPriority::Critical,
        });
        let status = if request.assigned_to.is_some() {
            WorkOrderStatus::Assigned
        } else {
            WorkOrderStatus::Pending
        };

        let mut tx = self.pool.begin().await?;

        let work_order = sqlx::query_as::<_, WorkOrder>(
            "INSERT INTO work_orders (company_id, school_id, report_id, asset_id, assigned_to, \
                                      title, description, priority, status, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(report.school_id)
        .bind(report.id)
        .bind(report.asset_id)
        .bind(request.assigned_to)
        .bind(request.title.unwrap_or_else(|| report.title.clone()))
        .bind(request.description.unwrap_or_else(|| report.description.clone()))
        .bind(priority)
        .bind(status)
        .bind(request.due_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE reports SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
        )
        .bind(report.id)
        .bind(ctx.company_id)
        .bind(ReportStatus::Converted)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::StatusChange,
                "report",
                Some(report.id),
                json!({ "from": report.status.as_str(), "to": "converted", "work_order_id": work_order.id }),
            )
            .await;

        if let Some(assignee) = work_order.assigned_to {
            let _ = self
                .notifications
                .notify(
                    ctx.company_id,
                    assignee,
                    NotificationKind::WorkOrderAssigned,
                    format!("Work order assigned: {}", work_order.title),
                    "A converted maintenance report was assigned to you".to_string(),
                    Some(("work_order", work_order.id)),
                )
                .await;
        }

        Ok(work_order)
    }
}
