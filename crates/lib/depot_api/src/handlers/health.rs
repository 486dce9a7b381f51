//! Liveness probe.

/// `GET /health` — plain-text liveness string, no auth.
pub async fn health_handler() -> &'static str {
    "Server is running!"
}
