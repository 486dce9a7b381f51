//! Gate-level tests that need no running infrastructure: a lazy pool is
//! never connected because every request is rejected before touching state.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use depot_api::config::ApiConfig;
use depot_api::{AppState, router};
use depot_core::store::MemoryBlobStore;
use depot_core::store::s3::S3Config;

fn test_state() -> AppState {
    let pool = sqlx::PgPool::connect_lazy("postgres://localhost:1/depot_unused")
        .expect("lazy pool");
    AppState {
        pool,
        store: Arc::new(MemoryBlobStore::new()),
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: "postgres://localhost:1/depot_unused".into(),
            jwt_secret: "test-secret".into(),
            bcrypt_cost: 4,
            s3: S3Config {
                endpoint: "http://localhost:9000".into(),
                access_key: "test".into(),
                secret_key: "test".into(),
                bucket: "test".into(),
                region: "us-east-1".into(),
            },
        },
    }
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

#[tokio::test]
async fn health_is_public() {
    let app = router(test_state());
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Server is running!");
}

#[tokio::test]
async fn missing_credential_is_rejected_before_any_state_access() {
    let app = router(test_state());
    let resp = app
        .oneshot(Request::builder().uri("/images").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "unauthorized");
    assert_eq!(json["message"], "Access denied");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = router(test_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/images")
                .header(header::AUTHORIZATION, "not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Invalid token");
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_rejected() {
    let app = router(test_state());
    let token =
        depot_core::auth::jwt::issue_session_token("u-1", "a@b.com", b"other-secret").unwrap();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/images")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
