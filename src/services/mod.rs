pub mod asset_service;
pub mod attendance_service;
pub mod audit_service;
pub mod auth_service;
pub mod company_service;
pub mod notification_service;
pub mod report_service;
pub mod school_service;
pub mod stats_service;
pub mod user_service;
pub mod work_order_service;

use std::collections::HashMap;
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;

pub use asset_service::AssetService;
pub use attendance_service::AttendanceService;
pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use company_service::CompanyService;
pub use notification_service::{NotificationChannel, NotificationService};
pub use report_service::ReportService;
pub use school_service::SchoolService;
pub use stats_service::StatsService;
pub use user_service::UserService;
pub use work_order_service::WorkOrderService;

/// Business-rule errors shared by all domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation { message: message.into(), field_errors: None }
    }

    pub fn field(field: impl Into<String>, problem: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), problem.into());
        ServiceError::Validation {
            message: "Invalid request".to_string(),
            field_errors: Some(field_errors),
        }
    }
}
