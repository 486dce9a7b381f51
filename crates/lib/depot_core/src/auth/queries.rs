//! Credential store queries.

use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::User;

/// Fetch a user by email, returning (id, username, password_hash).
pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<(String, String, String)>, AuthError> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        "SELECT id::text, username, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a user by id (without the password hash).
pub async fn get_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        "SELECT id::text, username, email FROM users WHERE id = $1::uuid",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, username, email)| User {
        id,
        username,
        email,
    }))
}

/// Provision a user, returning the user ID.
///
/// Users are created out-of-band (operator tooling, tests) — there is no
/// registration endpoint on the HTTP surface.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<String, AuthError> {
    let user_id = sqlx::query_scalar::<_, String>(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id::text",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(user_id)
}
