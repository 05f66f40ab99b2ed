use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::api::dto::LoginRequest;
use crate::auth::{self, Claims};
use crate::database::models::{AuditAction, Company, User};
use crate::services::{AuditService, ServiceError};

/// Dummy bcrypt hash used to equalize work when the account does not exist,
/// so response timing does not reveal which factor failed.
const PHANTOM_HASH: &str = "$2b$10$7EqJtq98hPqEX7fNZaFWoOhi5B0X1BCrTJZg8TwXiqg0d8wJk9uPW";

pub struct AuthService {
    pool: PgPool,
    audit: AuditService,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    /// Validate credentials against a company slug and return the user with
    /// a fresh JWT. Credential failures are indistinguishable to the caller;
    /// deactivated accounts are reported as forbidden only after the
    /// password verified.
    pub async fn login(&self, request: &LoginRequest) -> Result<(User, String), ServiceError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE slug = $1 AND deleted_at IS NULL",
        )
        .bind(&request.company)
        .fetch_optional(&self.pool)
        .await?;

        let user = match &company {
            Some(company) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users WHERE company_id = $1 AND lower(email) = lower($2) AND deleted_at IS NULL",
                )
                .bind(company.id)
                .bind(&request.email)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        let password_ok = match &user {
            Some(user) => auth::verify_password(&request.password, &user.password_hash),
            None => {
                // Burn comparable CPU even when the account is unknown
                let _ = auth::verify_password(&request.password, PHANTOM_HASH);
                false
            }
        };

        let (company, mut user) = match (company, user, password_ok) {
            (Some(company), Some(user), true) => (company, user),
            (company, user, _) => {
                self.audit
                    .record(
                        company.as_ref().map(|c| c.id),
                        user.as_ref().map(|u| u.id),
                        AuditAction::LoginFailed,
                        "user",
                        user.as_ref().map(|u| u.id),
                        json!({ "email": request.email, "company": request.company }),
                    )
                    .await;
                return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        if !company.is_active {
            return Err(ServiceError::Forbidden("Company is not active".to_string()));
        }
        if !user.is_active {
            return Err(ServiceError::Forbidden("User account is disabled".to_string()));
        }

        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await?;
        user.last_login_at = Some(Utc::now());

        self.audit
            .record(
                Some(company.id),
                Some(user.id),
                AuditAction::Login,
                "user",
                Some(user.id),
                json!({ "email": user.email }),
            )
            .await;

        let claims = Claims::new(user.id, user.company_id, user.email.clone(), user.role);
        let token = auth::generate_jwt(&claims)?;

        Ok((user, token))
    }

    /// Trade a still-valid (or recently expired, within the refresh window)
    /// token for a fresh one, re-checking the account is still live.
    pub async fn refresh(&self, token: &str) -> Result<(User, String), ServiceError> {
        let claims = auth::validate_jwt_for_refresh(token)?;

        let user = sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN companies c ON c.id = u.company_id \
             WHERE u.id = $1 AND u.deleted_at IS NULL AND u.is_active \
               AND c.deleted_at IS NULL AND c.is_active",
        )
        .bind(claims.sub)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("Account no longer active".to_string()))?;

        let claims = Claims::new(user.id, user.company_id, user.email.clone(), user.role);
        let token = auth::generate_jwt(&claims)?;
        Ok((user, token))
    }
}
