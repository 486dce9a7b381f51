//! # depot_api
//!
//! HTTP API library for Depot.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use depot_core::store::BlobStore;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, images, profile, tokens};

/// Upload body size cap: 1 GiB (container image tarballs are large).
const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// Object store adapter.
    pub store: Arc<dyn BlobStore>,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `depot_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    depot_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/health", get(health::health_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/profile", get(profile::profile_handler))
        .route("/upload", post(images::upload_handler))
        .route("/images", get(images::list_images_handler))
        .route(
            "/images/{id}",
            get(images::get_image_handler).delete(images::delete_image_handler),
        )
        .route(
            "/delete-all-images",
            delete(images::delete_all_images_handler),
        )
        .route("/generate-token", post(tokens::generate_token_handler))
        .route(
            "/delete-token/{token_id}",
            delete(tokens::delete_token_handler),
        )
        .route("/get-all-tokens", get(tokens::list_tokens_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}
