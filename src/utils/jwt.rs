// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::user::Role};

/// Identity carried by an access token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPayload {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Issues and decodes opaque access tokens.
pub trait TokenManager: Send + Sync {
    fn create_token(&self, payload: &TokenPayload) -> Result<String, AppError>;

    /// Returns `None` for malformed, expired or foreign tokens.
    fn payload(&self, token: &str) -> Option<TokenPayload>;
}

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID.
    pub sub: String,
    pub name: String,
    /// User's role ('NORMAL' or 'ADMIN').
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// HS256 token manager backed by a shared secret.
pub struct JwtTokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_seconds: u64,
}

impl JwtTokenManager {
    pub fn new(secret: &str, expiration_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_seconds,
        }
    }
}

impl TokenManager for JwtTokenManager {
    fn create_token(&self, payload: &TokenPayload) -> Result<String, AppError> {
        // Calculate expiration: current time + expiration_seconds
        let expiration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .as_secs() as usize
            + self.expiration_seconds as usize;

        let claims = Claims {
            sub: payload.id.clone(),
            name: payload.name.clone(),
            role: payload.role.as_str().to_owned(),
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    fn payload(&self, token: &str) -> Option<TokenPayload> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| tracing::debug!("Rejected token: {}", e))
            .ok()?;

        Some(TokenPayload {
            id: token_data.claims.sub,
            name: token_data.claims.name,
            role: Role::parse(&token_data.claims.role),
        })
    }
}

/// Raw token taken from the `Authorization` header.
///
/// Accepts both `Bearer <token>` and a bare token. A missing or empty header
/// is rejected with 400 before the handler runs; validity is checked by the
/// services.
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

        if token.is_empty() {
            return Err(AppError::bad_request("Authorization required."));
        }

        Ok(AuthToken(token.to_owned()))
    }
}
