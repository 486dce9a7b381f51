//! JWT issuance and verification (HS256).
//!
//! Two token shapes share one claims struct: short-lived session tokens for
//! interactive users, and long-lived automation tokens whose `jti` points at
//! a persisted row in the `tokens` table.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::info;

use super::AuthError;
use crate::models::auth::{AUTOMATION_ROLE, TokenClaims};

/// Session token lifetime: 1 hour.
pub const SESSION_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Automation token lifetime: 10 years.
pub const AUTOMATION_TOKEN_TTL_DAYS: i64 = 365 * 10;

/// Issue a signed session token for an interactive user (1 h expiry).
pub fn issue_session_token(
    user_id: &str,
    email: &str,
    secret: &[u8],
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: Some(user_id.to_string()),
        email: Some(email.to_string()),
        role: None,
        jti: None,
        exp: (now + Duration::seconds(SESSION_TOKEN_TTL_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    sign(&claims, secret)
}

/// Issue a signed automation token bound to a persisted token id.
///
/// Returns the token string and its expiry. The signature alone does not
/// authorize the caller: the gate re-checks the `jti` row on every request,
/// which is what makes revocation effective before the 10-year expiry.
pub fn issue_automation_token(
    token_id: &str,
    secret: &[u8],
) -> Result<(String, DateTime<Utc>), AuthError> {
    let now = Utc::now();
    let expires_at = now + Duration::days(AUTOMATION_TOKEN_TTL_DAYS);
    let claims = TokenClaims {
        sub: None,
        email: None,
        role: Some(AUTOMATION_ROLE.to_string()),
        jti: Some(token_id.to_string()),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };
    Ok((sign(&claims, secret)?, expires_at))
}

fn sign(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a bearer token's signature and expiry, returning the claims.
pub fn verify_token(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Resolve the JWT secret: env var `JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        if !secret.is_empty() {
            return secret;
        }
    }
    // Generate and persist
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("depot")
        .join("jwt-secret")
}
