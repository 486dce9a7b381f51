//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use depot_core::artifacts::ArtifactError;
use depot_core::auth::AuthError;
use depot_core::store::StoreError;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// JSON body returned for every failure: machine-readable kind plus a
/// human-readable message. Internals never leak into the body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Login failure — identical for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidLogin,

    /// Missing or invalid bearer credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Object store unreachable or operation failed.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::InvalidLogin => (
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                "Invalid email or password",
            ),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "Object store operation failed",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        };
        if matches!(self, AppError::Store(_) | AppError::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidLogin => AppError::InvalidLogin,
            AuthError::MissingCredential => AppError::Unauthorized("Access denied".into()),
            AuthError::InvalidCredential => AppError::Unauthorized("Invalid token".into()),
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ArtifactError> for AppError {
    fn from(e: ArtifactError) -> Self {
        match e {
            ArtifactError::NotFound => AppError::NotFound("Image not found".into()),
            ArtifactError::Store(e) => AppError::from(e),
            ArtifactError::Db(e) => AppError::from(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => AppError::NotFound(format!("object {key} not found")),
            other => AppError::Store(other.to_string()),
        }
    }
}
