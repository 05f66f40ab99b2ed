pub mod company;
pub mod fixture;
pub mod user;

use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::database::models::{Company, UserRole};
use crate::middleware::TenantContext;

/// Synthetic context for trusted CLI operations inside one company.
/// The nil actor id marks audit rows as CLI-originated.
pub fn cli_context(company: &Company) -> TenantContext {
    TenantContext {
        company_id: company.id,
        company_name: company.name.clone(),
        user_id: Uuid::nil(),
        role: UserRole::Root,
    }
}

/// `cafm health` - ping the database
pub async fn health(format: OutputFormat) -> anyhow::Result<()> {
    match DatabaseManager::health_check().await {
        Ok(()) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "database": "ok" })),
                OutputFormat::Text => println!("database: ok"),
            }
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("database unreachable: {}", e)),
    }
}
