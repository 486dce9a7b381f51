//! Automation token request handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use depot_core::auth::tokens;
use depot_core::models::auth::AutomationToken;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Caller;

#[derive(Debug, Serialize)]
pub struct GenerateTokenResponse {
    pub message: String,
    pub token: AutomationToken,
}

#[derive(Debug, Serialize)]
pub struct TokenListResponse {
    pub message: String,
    pub tokens: Vec<AutomationToken>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /generate-token` — issue and persist a new automation token.
pub async fn generate_token_handler(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<Caller>,
) -> AppResult<Json<GenerateTokenResponse>> {
    let token = tokens::issue_token(
        &state.pool,
        caller.0.uploader_label(),
        state.config.jwt_secret.as_bytes(),
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(GenerateTokenResponse {
        message: "Token generated and stored successfully".into(),
        token,
    }))
}

/// `DELETE /delete-token/{token_id}` — revoke an automation token.
pub async fn delete_token_handler(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let revoked = tokens::revoke_token(&state.pool, &token_id)
        .await
        .map_err(AppError::from)?;
    if !revoked {
        return Err(AppError::NotFound("Token not found".into()));
    }
    Ok(Json(MessageResponse {
        message: "Token deleted successfully".into(),
    }))
}

/// `GET /get-all-tokens` — list all automation tokens.
pub async fn list_tokens_handler(
    State(state): State<AppState>,
) -> AppResult<Json<TokenListResponse>> {
    let tokens = tokens::list_tokens(&state.pool)
        .await
        .map_err(AppError::from)?;
    Ok(Json(TokenListResponse {
        message: "All tokens retrieved successfully".into(),
        tokens,
    }))
}
