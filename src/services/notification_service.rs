use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Notification, NotificationKind};
use crate::database::repository::{Page, TenantRepository};
use crate::filter::FilterData;
use crate::middleware::TenantContext;
use crate::services::ServiceError;

/// Delivery seam for notifications. The database row is the system of
/// record; channels (log, email, push, ...) are best-effort fan-out.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, notification: &Notification) -> Result<(), ServiceError>;
}

/// Structured-log delivery, always registered. Real deployments append
/// email/push channels next to it.
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), ServiceError> {
        tracing::info!(
            user_id = %notification.user_id,
            kind = ?notification.kind,
            "notification: {}",
            notification.title
        );
        Ok(())
    }
}

pub struct NotificationService {
    pool: PgPool,
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            channels: vec![Arc::new(LogChannel)],
        }
    }

    pub fn with_channels(pool: PgPool, channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { pool, channels }
    }

    fn repo(&self, ctx: &TenantContext) -> TenantRepository<Notification> {
        TenantRepository::new("notifications", self.pool.clone(), ctx.company_id)
    }

    /// Store a notification and fan it out to every channel. Channel
    /// failures are logged, never propagated.
    pub async fn notify(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        entity: Option<(&str, Uuid)>,
    ) -> Result<Notification, ServiceError> {
        let (entity_type, entity_id) = match entity {
            Some((t, id)) => (Some(t.to_string()), Some(id)),
            None => (None, None),
        };

        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (company_id, user_id, kind, title, body, entity_type, entity_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(company_id)
        .bind(user_id)
        .bind(kind)
        .bind(title.into())
        .bind(body.into())
        .bind(entity_type)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await?;

        let deliveries = self.channels.iter().map(|channel| {
            let channel = channel.clone();
            let notification = notification.clone();
            async move {
                if let Err(e) = channel.deliver(&notification).await {
                    tracing::warn!("Notification channel '{}' failed: {}", channel.name(), e);
                }
            }
        });
        join_all(deliveries).await;

        Ok(notification)
    }

    /// List the calling user's notifications, newest first
    pub async fn list(
        &self,
        ctx: &TenantContext,
        unread_only: bool,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Page<Notification>, ServiceError> {
        let mut where_clause = json!({ "user_id": ctx.user_id.to_string() });
        if unread_only {
            where_clause["read_at"] = json!({ "$null": true });
        }

        let page = self
            .repo(ctx)
            .select_page(FilterData {
                where_clause: Some(where_clause),
                order: Some(json!("created_at desc")),
                limit: Some(limit.unwrap_or(crate::config::config().api.default_page_size as i32)),
                offset,
                ..Default::default()
            })
            .await?;
        Ok(page)
    }

    /// Mark one of the calling user's notifications read
    pub async fn mark_read(&self, ctx: &TenantContext, id: Uuid) -> Result<Notification, ServiceError> {
        let updated = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read_at = COALESCE(read_at, NOW()), updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND user_id = $3 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(id)
        .bind(ctx.company_id)
        .bind(ctx.user_id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| ServiceError::not_found("notification", id))
    }

    /// Mark all of the calling user's unread notifications read; returns the
    /// number affected.
    pub async fn mark_all_read(&self, ctx: &TenantContext) -> Result<u64, ServiceError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW(), updated_at = NOW() \
             WHERE company_id = $1 AND user_id = $2 AND read_at IS NULL AND deleted_at IS NULL",
        )
        .bind(ctx.company_id)
        .bind(ctx.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
