use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A managed facility. `name_ar` is the Arabic display name; `code` is
/// unique per company.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub name_ar: Option<String>,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
