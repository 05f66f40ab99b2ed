use sqlx::PgPool;

use crate::api::dto::{DashboardStats, StatusCount};
use crate::database::models::{Asset, Attendance, Report, ReportStatus, School, User, WorkOrder};
use crate::database::repository::TenantRepository;
use crate::filter::FilterData;
use crate::middleware::TenantContext;
use crate::services::ServiceError;

/// Dashboard aggregates, assembled from the grouped-count queries the
/// tenant repository provides.
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self, ctx: &TenantContext) -> Result<DashboardStats, ServiceError> {
        let schools: TenantRepository<School> =
            TenantRepository::new("schools", self.pool.clone(), ctx.company_id);
        let assets: TenantRepository<Asset> = TenantRepository::new("assets", self.pool.clone(), ctx.company_id);
        let users: TenantRepository<User> = TenantRepository::new("users", self.pool.clone(), ctx.company_id);
        let reports: TenantRepository<Report> =
            TenantRepository::new("reports", self.pool.clone(), ctx.company_id);
        let work_orders: TenantRepository<WorkOrder> =
            TenantRepository::new("work_orders", self.pool.clone(), ctx.company_id);
        let attendance: TenantRepository<Attendance> =
            TenantRepository::new("attendance", self.pool.clone(), ctx.company_id);

        let reports_by_status: Vec<StatusCount> = reports
            .count_by("status")
            .await?
            .into_iter()
            .map(StatusCount::from)
            .collect();
        let open_reports = reports_by_status
            .iter()
            .filter(|s| s.status == ReportStatus::Open.as_str() || s.status == ReportStatus::InReview.as_str())
            .map(|s| s.count)
            .sum();

        let work_orders_by_status: Vec<StatusCount> = work_orders
            .count_by("status")
            .await?
            .into_iter()
            .map(StatusCount::from)
            .collect();

        let open_attendance = attendance
            .count(FilterData {
                where_clause: Some(serde_json::json!({ "checked_out_at": { "$null": true } })),
                ..Default::default()
            })
            .await?;

        Ok(DashboardStats {
            schools: schools.count(FilterData::default()).await?,
            assets: assets.count(FilterData::default()).await?,
            users: users.count(FilterData::default()).await?,
            open_reports,
            reports_by_status,
            work_orders_by_status,
            open_attendance,
        })
    }
}
