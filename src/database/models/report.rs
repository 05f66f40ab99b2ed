use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::enums::{ReportPriority, ReportStatus};

/// A maintenance report raised against a school (optionally a specific asset)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub company_id: Uuid,
    pub school_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub reported_by: Uuid,
    pub title: String,
    pub description: String,
    pub priority: ReportPriority,
    pub status: ReportStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
