use clap::Subcommand;

use crate::api::dto::CreateUserRequest;
use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::database::models::UserRole;
use crate::services::{CompanyService, UserService};

use super::cli_context;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user within a company")]
    Create {
        #[arg(long, help = "Company slug the user belongs to")]
        company: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "admin", help = "root|admin|supervisor|technician|viewer")]
        role: String,
    },
}

pub async fn handle(cmd: UserCommands, format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;

    match cmd {
        UserCommands::Create { company, email, password, name, role } => {
            let role: UserRole = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;

            let company = CompanyService::new(pool.clone())
                .get_by_slug(&company)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            let ctx = cli_context(&company);
            let user = UserService::new(pool)
                .create(
                    &ctx,
                    CreateUserRequest {
                        email,
                        password,
                        display_name: name,
                        phone: None,
                        role,
                    },
                )
                .await
                .map_err(|e| anyhow::anyhow!("create failed: {}", e))?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                OutputFormat::Text => {
                    println!("Created {} user {} in {} ({})", user.role.as_str(), user.email, company.slug, user.id)
                }
            }
        }
    }

    Ok(())
}
