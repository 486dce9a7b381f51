//! API server configuration.

use depot_core::auth::jwt::resolve_jwt_secret;
use depot_core::auth::password::DEFAULT_BCRYPT_COST;
use depot_core::store::s3::S3Config;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// bcrypt cost factor for password verification.
    pub bcrypt_cost: u32,
    /// Object store connection settings.
    pub s3: S3Config,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable        | Default                          |
    /// |-----------------|----------------------------------|
    /// | `BIND_ADDR`     | `0.0.0.0:5000`                   |
    /// | `DATABASE_URL`  | `postgres://localhost:5432/depot` |
    /// | `JWT_SECRET`    | generated & persisted to file    |
    /// | `BCRYPT_COST`   | `10`                             |
    /// | `S3_ENDPOINT`   | `http://localhost:9000`          |
    /// | `S3_ACCESS_KEY` | `minioadmin`                     |
    /// | `S3_SECRET_KEY` | `minioadmin`                     |
    /// | `S3_BUCKET`     | `docker-images`                  |
    /// | `S3_REGION`     | `us-east-1`                      |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/depot".into()),
            jwt_secret: resolve_jwt_secret(),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BCRYPT_COST),
            s3: S3Config {
                endpoint: std::env::var("S3_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:9000".into()),
                access_key: std::env::var("S3_ACCESS_KEY")
                    .unwrap_or_else(|_| "minioadmin".into()),
                secret_key: std::env::var("S3_SECRET_KEY")
                    .unwrap_or_else(|_| "minioadmin".into()),
                bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "docker-images".into()),
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            },
        }
    }
}
