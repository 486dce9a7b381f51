//! Authentication service — login and provisioning flows delegating to
//! `depot_core::auth`.

use sqlx::PgPool;
use tracing::info;

use depot_core::auth::jwt::issue_session_token;
use depot_core::auth::password::{hash_password, verify_password};
use depot_core::auth::queries;

use crate::error::{AppError, AppResult};

/// Authenticate with email + password, returning a signed session token.
///
/// Unknown email and wrong password produce the same error so callers
/// cannot probe which accounts exist.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    jwt_secret: &[u8],
) -> AppResult<String> {
    let row = queries::find_user_by_email(pool, email).await?;

    let (user_id, _username, pw_hash) = match row {
        None => return Err(AppError::InvalidLogin),
        Some(r) => r,
    };

    if !verify_password(password, &pw_hash).map_err(AppError::from)? {
        return Err(AppError::InvalidLogin);
    }

    let token = issue_session_token(&user_id, email, jwt_secret).map_err(AppError::from)?;
    info!(email, "login successful");
    Ok(token)
}

/// Provision a user account if the email is not already registered.
///
/// Not exposed over HTTP; used by operator tooling and tests.
pub async fn provision_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> AppResult<String> {
    if let Some((user_id, _, _)) = queries::find_user_by_email(pool, email).await? {
        return Ok(user_id);
    }
    let pw_hash = hash_password(password, bcrypt_cost).map_err(AppError::from)?;
    let user_id = queries::create_user(pool, username, email, &pw_hash).await?;
    info!(email, "user provisioned");
    Ok(user_id)
}
