//! Automation token lifecycle.
//!
//! Long-lived bearer tokens for non-interactive clients. Each issued token
//! is persisted by `token_id`; the auth gate consults this table on every
//! automation request, so revoking (deleting) a row takes effect immediately
//! even though the JWT signature stays valid until its embedded expiry.

use sqlx::PgPool;

use super::AuthError;
use super::jwt::issue_automation_token;
use crate::models::auth::AutomationToken;
use crate::uuid::uuidv7;

/// Issue and persist a new automation token.
///
/// `created_by` records the issuer identity (email, or `"automation"` when
/// an automation client issues a successor token).
pub async fn issue_token(
    pool: &PgPool,
    created_by: &str,
    secret: &[u8],
) -> Result<AutomationToken, AuthError> {
    let token_id = uuidv7().to_string();
    let (token, expires_at) = issue_automation_token(&token_id, secret)?;

    sqlx::query(
        "INSERT INTO tokens (token_id, token, created_by, expires_at) \
         VALUES ($1::uuid, $2, $3, $4)",
    )
    .bind(&token_id)
    .bind(&token)
    .bind(created_by)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(AutomationToken {
        token_id,
        token,
        created_by: created_by.to_string(),
        expires_at,
    })
}

/// Check whether a token id is still persisted (i.e. not revoked).
pub async fn token_exists(pool: &PgPool, token_id: &str) -> Result<bool, AuthError> {
    // A malformed id cannot match any row.
    if uuid::Uuid::parse_str(token_id).is_err() {
        return Ok(false);
    }
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM tokens WHERE token_id = $1::uuid)",
    )
    .bind(token_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Revoke a token by id. Returns `false` when no such row exists.
pub async fn revoke_token(pool: &PgPool, token_id: &str) -> Result<bool, AuthError> {
    if uuid::Uuid::parse_str(token_id).is_err() {
        return Ok(false);
    }
    let result = sqlx::query("DELETE FROM tokens WHERE token_id = $1::uuid")
        .bind(token_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// List all automation tokens, newest first.
///
/// Rows include the full token value — exposed to authorized callers only.
pub async fn list_tokens(pool: &PgPool) -> Result<Vec<AutomationToken>, AuthError> {
    let rows = sqlx::query_as::<
        _,
        (String, String, String, chrono::DateTime<chrono::Utc>),
    >(
        "SELECT token_id::text, token, created_by, expires_at \
         FROM tokens ORDER BY token_id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(token_id, token, created_by, expires_at)| AutomationToken {
            token_id,
            token,
            created_by,
            expires_at,
        })
        .collect())
}
