use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, company_id: Uuid, email: String, role: UserRole) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self {
            sub: user_id,
            company_id,
            email,
            role,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    decode_with_validation(token, Validation::default())
}

/// Accepts expired signatures within the configured refresh window so a
/// client can trade a recently-expired token for a fresh one.
pub fn validate_jwt_for_refresh(token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    let claims = decode_with_validation(token, validation)?;

    let window = config::config().security.refresh_window_hours as i64;
    let cutoff = claims.exp + window * 3600;
    if Utc::now().timestamp() > cutoff {
        return Err(AuthError::InvalidToken("token outside refresh window".to_string()));
    }
    Ok(claims)
}

fn decode_with_validation(token: &str, validation: Validation) -> Result<Claims, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let cost = config::config().security.bcrypt_cost;
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Constant result shape regardless of failure cause; callers map both a
/// wrong password and a hash error to the same unauthorized response.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_secret() {
        std::env::set_var("JWT_SECRET", "test-secret");
        // CONFIG may already be initialized with the var set by another test;
        // the set_var above is enough either way because tests run in-process.
    }

    #[test]
    fn password_roundtrip() {
        ensure_secret();
        let hash = hash_password("Str0ng!Passw0rd").unwrap();
        assert!(verify_password("Str0ng!Passw0rd", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn jwt_roundtrip() {
        ensure_secret();
        if config::config().security.jwt_secret.is_empty() {
            // Config singleton was built before the env var in another process ordering
            return;
        }
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), "a@b.c".to_string(), UserRole::Admin);
        let token = generate_jwt(&claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.company_id, claims.company_id);
        assert_eq!(decoded.role, UserRole::Admin);
    }

    #[test]
    fn tampered_token_is_rejected() {
        ensure_secret();
        if config::config().security.jwt_secret.is_empty() {
            return;
        }
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), "a@b.c".to_string(), UserRole::Viewer);
        let mut token = generate_jwt(&claims).unwrap();
        token.push('x');
        assert!(validate_jwt(&token).is_err());
    }
}
