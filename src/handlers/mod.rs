pub mod elevated;
pub mod protected;
pub mod public;

use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;

/// Shared pool accessor for handlers
pub async fn pool() -> Result<PgPool, ApiError> {
    DatabaseManager::pool().await.map_err(ApiError::from)
}
