use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::AuditAction;

/// Writes the append-only security audit trail.
///
/// Audit writes are best-effort: a failed insert is logged and swallowed so
/// it can never fail the business operation it describes.
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        company_id: Option<Uuid>,
        user_id: Option<Uuid>,
        action: AuditAction,
        entity_type: &str,
        entity_id: Option<Uuid>,
        details: Value,
    ) {
        if !crate::config::config().security.enable_audit_logging {
            return;
        }

        let result = sqlx::query(
            "INSERT INTO audit_entries (company_id, user_id, action, entity_type, entity_id, details) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(company_id)
        .bind(user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!("Audit write failed for {:?} on {}: {}", action, entity_type, e);
        }
    }
}
