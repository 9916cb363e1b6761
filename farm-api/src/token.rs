//! HS256 access and refresh tokens.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{ApiError, AuthError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: i32,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: TokenKind,
}

impl Claims {
    fn new(config: &AuthConfig, user_id: i32, kind: TokenKind) -> Self {
        let now = Utc::now();
        let lifetime = match kind {
            TokenKind::Access => config.access_lifetime(),
            TokenKind::Refresh => config.refresh_lifetime(),
        };
        Claims {
            sub: user_id.to_string(),
            user_id,
            iss: config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn encode_claims(config: &AuthConfig, claims: &Claims) -> Result<String, ApiError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {}", e)))
}

pub fn issue_token(config: &AuthConfig, user_id: i32, kind: TokenKind) -> Result<String, ApiError> {
    encode_claims(config, &Claims::new(config, user_id, kind))
}

pub fn issue_pair(config: &AuthConfig, user_id: i32) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
        access: issue_token(config, user_id, TokenKind::Access)?,
        refresh: issue_token(config, user_id, TokenKind::Refresh)?,
    })
}

/// Verifies signature, issuer, expiry and token type.
pub fn decode_token(config: &AuthConfig, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!("Rejected token: {}", e);
        AuthError::InvalidToken
    })?;

    if data.claims.token_type != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(data.claims)
}
