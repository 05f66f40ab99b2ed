use clap::Subcommand;
use serde::Deserialize;

use crate::api::dto::{CreateSchoolRequest, CreateUserRequest};
use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::database::models::UserRole;
use crate::services::{CompanyService, SchoolService, ServiceError, UserService};

use super::cli_context;

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Load a company, its users and schools from a YAML file")]
    Load {
        #[arg(help = "Path to the fixture YAML")]
        path: String,
    },
}

/// Fixture file shape:
///
/// ```yaml
/// company:
///   name: Al Noor Education
///   slug: al-noor
/// users:
///   - email: admin@alnoor.example
///     password: "ChangeMe1!"
///     name: Admin
///     role: admin
/// schools:
///   - name: Al Noor Primary
///     name_ar: "مدرسة النور الابتدائية"
///     code: SCH-001
///     city: Riyadh
/// ```
#[derive(Debug, Deserialize)]
struct Fixture {
    company: FixtureCompany,
    #[serde(default)]
    users: Vec<FixtureUser>,
    #[serde(default)]
    schools: Vec<FixtureSchool>,
}

#[derive(Debug, Deserialize)]
struct FixtureCompany {
    name: String,
    slug: String,
    contact_email: Option<String>,
    contact_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FixtureUser {
    email: String,
    password: String,
    name: String,
    role: String,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FixtureSchool {
    name: String,
    name_ar: Option<String>,
    code: String,
    address: Option<String>,
    city: Option<String>,
    region: Option<String>,
}

pub async fn handle(cmd: FixtureCommands, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FixtureCommands::Load { path } => load(&path, format).await,
    }
}

async fn load(path: &str, format: OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let fixture: Fixture = serde_yaml::from_str(&raw)?;

    let pool = DatabaseManager::pool().await?;
    let companies = CompanyService::new(pool.clone());

    // Idempotent on the company: reuse it when the slug already exists
    let company = match companies.get_by_slug(&fixture.company.slug).await {
        Ok(existing) => existing,
        Err(ServiceError::NotFound(_)) => companies
            .create(
                None,
                crate::api::dto::CreateCompanyRequest {
                    name: fixture.company.name.clone(),
                    slug: fixture.company.slug.clone(),
                    contact_email: fixture.company.contact_email.clone(),
                    contact_phone: fixture.company.contact_phone.clone(),
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("company create failed: {}", e))?,
        Err(e) => return Err(anyhow::anyhow!("company lookup failed: {}", e)),
    };

    let ctx = cli_context(&company);
    let mut created_users = 0usize;
    let mut created_schools = 0usize;

    let users = UserService::new(pool.clone());
    for user in &fixture.users {
        let role: UserRole = user.role.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        match users
            .create(
                &ctx,
                CreateUserRequest {
                    email: user.email.clone(),
                    password: user.password.clone(),
                    display_name: user.name.clone(),
                    phone: user.phone.clone(),
                    role,
                },
            )
            .await
        {
            Ok(_) => created_users += 1,
            Err(e) => tracing::warn!("Skipping user {}: {}", user.email, e),
        }
    }

    let schools = SchoolService::new(pool);
    for school in &fixture.schools {
        match schools
            .create(
                &ctx,
                CreateSchoolRequest {
                    name: school.name.clone(),
                    name_ar: school.name_ar.clone(),
                    code: school.code.clone(),
                    address: school.address.clone(),
                    city: school.city.clone(),
                    region: school.region.clone(),
                    contact_phone: None,
                },
            )
            .await
        {
            Ok(_) => created_schools += 1,
            Err(e) => tracing::warn!("Skipping school {}: {}", school.code, e),
        }
    }

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "company": company.slug,
                "users_created": created_users,
                "schools_created": created_schools,
            })
        ),
        OutputFormat::Text => println!(
            "Loaded fixture into {}: {} users, {} schools",
            company.slug, created_users, created_schools
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixture_yaml() {
        let raw = r#"
company:
  name: Al Noor Education
  slug: al-noor
users:
  - email: admin@alnoor.example
    password: "ChangeMe1!"
    name: Admin
    role: admin
schools:
  - name: Al Noor Primary
    name_ar: "مدرسة النور الابتدائية"
    code: SCH-001
    city: Riyadh
"#;
        let fixture: Fixture = serde_yaml::from_str(raw).unwrap();
        assert_eq!(fixture.company.slug, "al-noor");
        assert_eq!(fixture.users.len(), 1);
        assert_eq!(fixture.users[0].role, "admin");
        assert_eq!(fixture.schools.len(), 1);
        assert!(fixture.schools[0].name_ar.as_deref().unwrap().contains("مدرسة"));
    }

    #[test]
    fn fixture_sections_are_optional() {
        let raw = "company:\n  name: X\n  slug: x-co\n";
        let fixture: Fixture = serde_yaml::from_str(raw).unwrap();
        assert!(fixture.users.is_empty());
        assert!(fixture.schools.is_empty());
    }
}
