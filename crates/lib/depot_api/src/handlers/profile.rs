//! Profile handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use depot_core::auth::queries;
use depot_core::models::auth::{Identity, User};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Caller;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub profile: User,
}

/// `GET /profile` — details for the authenticated user.
///
/// Automation callers have no user row and get 404.
pub async fn profile_handler(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<Caller>,
) -> AppResult<Json<ProfileResponse>> {
    let user_id = match &caller.0 {
        Identity::Session { user_id, .. } => user_id,
        Identity::Automation { .. } => {
            return Err(AppError::NotFound("User not found".into()));
        }
    };

    let profile = queries::get_user_by_id(&state.pool, user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        message: "Profile retrieved successfully".into(),
        profile,
    }))
}
