use clap::Subcommand;

use crate::api::dto::CreateCompanyRequest;
use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::services::CompanyService;

#[derive(Subcommand)]
pub enum CompanyCommands {
    #[command(about = "Create a company (tenant)")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, help = "URL-safe unique identifier, e.g. al-noor-schools")]
        slug: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    #[command(about = "List companies")]
    List {
        #[arg(long)]
        include_deleted: bool,
    },
}

pub async fn handle(cmd: CompanyCommands, format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    let service = CompanyService::new(pool);

    match cmd {
        CompanyCommands::Create { name, slug, email, phone } => {
            let company = service
                .create(
                    None,
                    CreateCompanyRequest {
                        name,
                        slug,
                        contact_email: email,
                        contact_phone: phone,
                    },
                )
                .await
                .map_err(|e| anyhow::anyhow!("create failed: {}", e))?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&company)?),
                OutputFormat::Text => println!("Created company {} ({})", company.slug, company.id),
            }
        }
        CompanyCommands::List { include_deleted } => {
            let page = service
                .list(include_deleted, Some(100), None)
                .await
                .map_err(|e| anyhow::anyhow!("list failed: {}", e))?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page.items)?),
                OutputFormat::Text => {
                    for company in page.items {
                        let state = if company.deleted_at.is_some() {
                            "deleted"
                        } else if company.is_active {
                            "active"
                        } else {
                            "inactive"
                        };
                        println!("{}  {}  {}  [{}]", company.id, company.slug, company.name, state);
                    }
                }
            }
        }
    }

    Ok(())
}
