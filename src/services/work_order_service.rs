use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::dto::{CreateWorkOrderRequest, UpdateWorkOrderRequest};
use crate::database::models::{AuditAction, NotificationKind, Report, WorkOrder, WorkOrderStatus};
use crate::database::repository::{Page, TenantRepository};
use crate::middleware::TenantContext;
use crate::services::{AssetService, AuditService, NotificationService, SchoolService, ServiceError, UserService};

#[derive(Debug, Default)]
pub struct WorkOrderListParams {
    pub school_id: Option<Uuid>,
    pub status: Option<WorkOrderStatus>,
    pub assigned_to: Option<Uuid>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

pub struct WorkOrderService {
    pool: PgPool,
    audit: AuditService,
    notifications: NotificationService,
}

impl WorkOrderService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        let notifications = NotificationService::new(pool.clone());
        Self { pool, audit, notifications }
    }

    fn repo(&self, ctx: &TenantContext) -> TenantRepository<WorkOrder> {
        TenantRepository::new("work_orders", self.pool.clone(), ctx.company_id)
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        params: WorkOrderListParams,
    ) -> Result<Page<WorkOrder>, ServiceError> {
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
        if params.assigned_to.is_some() {
            n += 1;
            conditions.push_str(&format!(" AND assigned_to = ${}", n));
        }

        let list_sql = format!(
            "SELECT * FROM work_orders WHERE {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            n + 1,
            n + 2
        );
        let count_sql = format!("SELECT COUNT(*) FROM work_orders WHERE {}", conditions);

        let mut list_query = sqlx::query_as::<_, WorkOrder>(&list_sql).bind(ctx.company_id);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(ctx.company_id);
        if let Some(school_id) = params.school_id {
            list_query = list_query.bind(school_id);
            count_query = count_query.bind(school_id);
        }
        if let Some(status) = params.status {
            list_query = list_query.bind(status);
            count_query = count_query.bind(status);
        }
        if let Some(assigned_to) = params.assigned_to {
            list_query = list_query.bind(assigned_to);
            count_query = count_query.bind(assigned_to);
        }

        let items = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok(Page { items, total, limit, offset })
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<WorkOrder, ServiceError> {
        self.repo(ctx)
            .select_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("work order", id))
    }

    pub async fn create(
        &self,
        ctx: &TenantContext,
        request: CreateWorkOrderRequest,
    ) -> Result<WorkOrder, ServiceError> {
        if !ctx.role.can_assign_work() {
            return Err(ServiceError::Forbidden("Supervisor role required".to_string()));
        }
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
        if let Some(assignee) = request.assigned_to {
            UserService::new(self.pool.clone()).get(ctx, assignee).await?;
        }

        let status = if request.assigned_to.is_some() {
            WorkOrderStatus::Assigned
        } else {
            WorkOrderStatus::Pending
        };

        let work_order = sqlx::query_as::<_, WorkOrder>(
            "INSERT INTO work_orders (company_id, school_id, asset_id, assigned_to, title, description, \
                                      priority, status, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(ctx.company_id)
        .bind(request.school_id)
        .bind(request.asset_id)
        .bind(request.assigned_to)
        .bind(request.title.trim())
        .bind(request.description.trim())
        .bind(request.priority)
        .bind(status)
        .bind(request.due_date)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Create,
                "work_order",
                Some(work_order.id),
                json!({ "school_id": work_order.school_id, "priority": work_order.priority }),
            )
            .await;

        if let Some(assignee) = work_order.assigned_to {
            self.notify_assignment(ctx, &work_order, assignee).await;
        }

        Ok(work_order)
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        request: UpdateWorkOrderRequest,
    ) -> Result<WorkOrder, ServiceError> {
        if !ctx.role.can_assign_work() {
            return Err(ServiceError::Forbidden("Supervisor role required".to_string()));
        }

        let existing = self.get(ctx, id).await?;
        if existing.status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "Work order is {} and can no longer be edited",
                existing.status.as_str()
            )));
        }

        let updated = sqlx::query_as::<_, WorkOrder>(
            "UPDATE work_orders SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                priority = COALESCE($5, priority), \
                due_date = COALESCE($6, due_date), \
                updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.priority)
        .bind(request.due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("work order", id))?;

        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::Update, "work_order", Some(id), json!({}))
            .await;

        Ok(updated)
    }

    /// Assign (or reassign) a work order. Allowed while the order has not
    /// started; a pending order becomes assigned.
    pub async fn assign(&self, ctx: &TenantContext, id: Uuid, user_id: Uuid) -> Result<WorkOrder, ServiceError> {
        if !ctx.role.can_assign_work() {
            return Err(ServiceError::Forbidden("Supervisor role required".to_string()));
        }

        let work_order = self.get(ctx, id).await?;
        if !matches!(work_order.status, WorkOrderStatus::Pending | WorkOrderStatus::Assigned) {
            return Err(ServiceError::Conflict(format!(
                "Work order is {} and cannot be reassigned",
                work_order.status.as_str()
            )));
        }

        let assignee = UserService::new(self.pool.clone()).get(ctx, user_id).await?;
        if !assignee.is_active {
            return Err(ServiceError::Conflict("Assignee account is disabled".to_string()));
        }

        let updated = sqlx::query_as::<_, WorkOrder>(
            "UPDATE work_orders SET assigned_to = $3, status = $4, updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(user_id)
        .bind(WorkOrderStatus::Assigned)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("work order", id))?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::Update,
                "work_order",
                Some(id),
                json!({ "assigned_to": user_id }),
            )
            .await;

        self.notify_assignment(ctx, &updated, user_id).await;

        Ok(updated)
    }

    /// Move the work order along its lifecycle. Starting stamps started_at;
    /// completing stamps completed_at and records the completion notes.
    /// Technicians may only move orders assigned to them.
    pub async fn transition(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        next: WorkOrderStatus,
        completion_notes: Option<String>,
    ) -> Result<WorkOrder, ServiceError> {
        let work_order = self.get(ctx, id).await?;

        if !ctx.role.can_assign_work() && work_order.assigned_to != Some(ctx.user_id) {
            return Err(ServiceError::Forbidden(
                "Only the assignee or a supervisor can update this work order".to_string(),
            ));
        }
        if !work_order.status.can_transition_to(next) {
            return Err(ServiceError::Conflict(format!(
                "Cannot move work order from {} to {}",
                work_order.status.as_str(),
                next.as_str()
            )));
        }

        let starting = next == WorkOrderStatus::InProgress && work_order.started_at.is_none();
        let completing = next == WorkOrderStatus::Completed;

        let updated = sqlx::query_as::<_, WorkOrder>(
            "UPDATE work_orders SET status = $3, \
                started_at = CASE WHEN $4 THEN NOW() ELSE started_at END, \
                completed_at = CASE WHEN $5 THEN NOW() ELSE completed_at END, \
                completion_notes = COALESCE($6, completion_notes), \
                updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(next)
        .bind(starting)
        .bind(completing)
        .bind(completion_notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("work order", id))?;

        self.audit
            .record(
                Some(ctx.company_id),
                Some(ctx.user_id),
                AuditAction::StatusChange,
                "work_order",
                Some(id),
                json!({ "from": work_order.status.as_str(), "to": next.as_str() }),
            )
            .await;

        if completing {
            self.notify_completion(ctx, &updated).await?;
        }

        Ok(updated)
    }

    pub async fn soft_delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).soft_delete(id).await? {
            return Err(ServiceError::not_found("work order", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::SoftDelete, "work_order", Some(id), json!({}))
            .await;
        Ok(())
    }

    pub async fn restore(&self, ctx: &TenantContext, id: Uuid) -> Result<WorkOrder, ServiceError> {
        ctx.require_admin().map_err(|_| ServiceError::Forbidden("Administrator role required".to_string()))?;

        if !self.repo(ctx).restore(id).await? {
            return Err(ServiceError::not_found("deleted work order", id));
        }
        self.audit
            .record(Some(ctx.company_id), Some(ctx.user_id), AuditAction::Restore, "work_order", Some(id), json!({}))
            .await;
        self.get(ctx, id).await
    }

    async fn notify_assignment(&self, ctx: &TenantContext, work_order: &WorkOrder, assignee: Uuid) {
        let _ = self
            .notifications
            .notify(
                ctx.company_id,
                assignee,
                NotificationKind::WorkOrderAssigned,
                format!("Work order assigned: {}", work_order.title),
                format!("Priority {:?}, due {:?}", work_order.priority, work_order.due_date),
                Some(("work_order", work_order.id)),
            )
            .await;
    }

    /// On completion, tell the author of the source report (when there is one)
    async fn notify_completion(&self, ctx: &TenantContext, work_order: &WorkOrder) -> Result<(), ServiceError> {
        let Some(report_id) = work_order.report_id else {
            return Ok(());
        };

        let report = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
        )
        .bind(report_id)
        .bind(ctx.company_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(report) = report {
            let _ = self
                .notifications
                .notify(
                    ctx.company_id,
                    report.reported_by,
                    NotificationKind::WorkOrderCompleted,
                    format!("Work completed: {}", work_order.title),
                    "The work order created from your report was completed".to_string(),
                    Some(("work_order", work_order.id)),
                )
                .await;
        }
        Ok(())
    }
}
