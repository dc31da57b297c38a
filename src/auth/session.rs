use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session")]
    Missing,

    #[error("session expired")]
    Expired,

    #[error("invalid session token: {0}")]
    Invalid(String),

    #[error("session token generation failed: {0}")]
    Encoding(String),

    #[error("session secret not configured")]
    InvalidSecret,
}

/// Contents of the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub session_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id: user.id,
            username: user.username.clone(),
            session_id: Uuid::new_v4(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Sign `claims` into a session token.
pub fn issue(claims: &Claims, security: &SecurityConfig) -> Result<String, SessionError> {
    if security.session_secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.session_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| SessionError::Encoding(e.to_string()))
}

/// Check the signature and expiry of a session token.
pub fn verify(token: &str, security: &SecurityConfig) -> Result<Claims, SessionError> {
    if security.session_secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.session_secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(e.to_string()),
        })
}
