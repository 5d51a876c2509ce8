use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Authenticated caller, as established by a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub, email: claims.email }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn issue_token(security: &SecurityConfig, user_id: Uuid, email: Option<String>) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let claims = Claims::new(user_id, email, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn verify_token(security: &SecurityConfig, token: &str) -> Result<Principal, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims.into())
}
