//! Depot registry server binary.
//!
//! Wires the connection pool, object store, and router together, runs
//! migrations, and ensures the bucket exists before accepting uploads.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use depot_api::config::ApiConfig;
use depot_core::store::S3BlobStore;

/// CLI arguments for the registry server.
#[derive(Parser, Debug)]
#[command(name = "depot_server", about = "Depot artifact registry server")]
struct Args {
    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Provision a user at startup, formatted `username:email:password`.
    /// Skipped if the email is already registered. There is no registration
    /// endpoint; this is the only built-in way to create accounts.
    #[arg(long, env = "PROVISION_USER")]
    provision_user: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,depot_api=debug,depot_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = ApiConfig::from_env();

    info!(bind_addr = %config.bind_addr, "starting depot_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    depot_api::migrate(&pool).await?;

    // The bucket must exist before the first upload is accepted.
    let store = S3BlobStore::connect(&config.s3);
    store.ensure_bucket().await?;
    info!(bucket = %config.s3.bucket, "object store ready");

    if let Some(raw) = &args.provision_user {
        let mut parts = raw.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(username), Some(email), Some(password)) => {
                depot_api::services::auth::provision_user(
                    &pool,
                    username,
                    email,
                    password,
                    config.bcrypt_cost,
                )
                .await?;
            }
            _ => {
                return Err("--provision-user expects username:email:password".into());
            }
        }
    }

    let state = depot_api::AppState {
        pool,
        store: Arc::new(store),
        config: config.clone(),
    };

    let app = depot_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "registry listening");

    axum::serve(listener, app).await?;

    Ok(())
}
