use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::dto::{
    AssetResponse, AttendanceResponse, NotificationResponse, ReportResponse, SchoolResponse, UserResponse,
    WorkOrderResponse,
};
use crate::database::models::{Asset, Attendance, Notification, Report, School, User, WorkOrder};
use crate::database::repository::TenantRepository;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, TenantContext};

/// POST /api/find/:entity - Filter-language search over a whitelisted
/// entity set. Always tenant-scoped; the scope is injected below any
/// user-supplied conditions.
pub async fn find(
    Extension(ctx): Extension<TenantContext>,
    Path(entity): Path<String>,
    Json(mut filter): Json<FilterData>,
) -> Result<Response, ApiError> {
    // Rows decode into typed entities, so column projection is not supported
    filter.select = None;

    let pool = super::super::pool().await?;

    match entity.as_str() {
        "schools" => {
            let repo: TenantRepository<School> = TenantRepository::new("schools", pool, ctx.company_id);
            let page = repo.select_page(filter).await?;
            Ok(ApiResponse::paginated(page.map(SchoolResponse::from)).into_response())
        }
        "assets" => {
            let repo: TenantRepository<Asset> = TenantRepository::new("assets", pool, ctx.company_id);
            let page = repo.select_page(filter).await?;
            Ok(ApiResponse::paginated(page.map(AssetResponse::from)).into_response())
        }
        "reports" => {
            let repo: TenantRepository<Report> = TenantRepository::new("reports", pool, ctx.company_id);
            let page = repo.select_page(filter).await?;
            Ok(ApiResponse::paginated(page.map(ReportResponse::from)).into_response())
        }
        "work_orders" => {
            let repo: TenantRepository<WorkOrder> = TenantRepository::new("work_orders", pool, ctx.company_id);
            let page = repo.select_page(filter).await?;
            Ok(ApiResponse::paginated(page.map(WorkOrderResponse::from)).into_response())
        }
        "attendance" => {
            let repo: TenantRepository<Attendance> = TenantRepository::new("attendance", pool, ctx.company_id);
            let page = repo.select_page(filter).await?;
            Ok(ApiResponse::paginated(page.map(AttendanceResponse::from)).into_response())
        }
        "notifications" => {
            let repo: TenantRepository<Notification> =
                TenantRepository::new("notifications", pool, ctx.company_id);
            let page = repo.select_page(filter).await?;
            Ok(ApiResponse::paginated(page.map(NotificationResponse::from)).into_response())
        }
        "users" => {
            ctx.require_admin()?;
            let repo: TenantRepository<User> = TenantRepository::new("users", pool, ctx.company_id);
            let page = repo.select_page(filter).await?;
            Ok(ApiResponse::paginated(page.map(UserResponse::from)).into_response())
        }
        other => Err(ApiError::not_found(format!("Unknown entity: {}", other))),
    }
}
