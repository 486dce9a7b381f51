//! Authentication middleware — the single enforcement point for access
//! control. Every gated route passes through here before touching state.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use depot_core::auth::{jwt::verify_token, tokens};
use depot_core::models::auth::Identity;

use crate::AppState;
use crate::error::AppError;

/// Verified caller identity, stored in request extensions for handlers.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

/// Axum middleware: reads the raw bearer token from `Authorization`
/// (no scheme prefix), verifies signature and expiry, and injects the
/// caller's [`Identity`].
///
/// Session tokens are stateless: signature + expiry suffice. Automation
/// tokens additionally require their `jti` row to still exist in the
/// `tokens` table, which is what makes revocation take effect immediately.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Access denied".into()))?;

    let claims = verify_token(token, state.config.jwt_secret.as_bytes())
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    let identity = claims
        .identity()
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    if let Identity::Automation { token_id } = &identity {
        // Revocation check: a deleted row invalidates the token even though
        // its signature remains verifiable until expiry.
        if !tokens::token_exists(&state.pool, token_id).await? {
            return Err(AppError::Unauthorized("Invalid token".into()));
        }
    }

    request.extensions_mut().insert(Caller(identity));

    Ok(next.run(request).await)
}
