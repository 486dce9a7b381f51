//! Authentication and authorization logic.
//!
//! Password hashing, JWT issuance/verification, credential store queries,
//! and the automation token lifecycle.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod tokens;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately carries no detail about
    /// which check failed.
    #[error("Invalid email or password")]
    InvalidLogin,

    /// No bearer token supplied.
    #[error("Access denied")]
    MissingCredential,

    /// Bearer token failed signature, expiry, shape, or revocation checks.
    #[error("Invalid token")]
    InvalidCredential,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
