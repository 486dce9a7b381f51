//! End-to-end registry flow against an ephemeral PostgreSQL instance and an
//! in-memory blob store. Skipped when the PostgreSQL toolchain is absent.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bytes::Bytes;
use tower::ServiceExt;

use depot_api::config::ApiConfig;
use depot_api::services::auth::provision_user;
use depot_api::{AppState, router};
use depot_core::artifacts::{ArtifactError, pipeline};
use depot_core::db::EphemeralPg;
use depot_core::models::auth::Identity;
use depot_core::store::s3::S3Config;
use depot_core::store::{BlobStore, MemoryBlobStore, StoreError};

const JWT_SECRET: &str = "test-secret";
const BCRYPT_COST: u32 = 4;
const BOUNDARY: &str = "depot-test-boundary";

struct TestEnv {
    pg: EphemeralPg,
    pool: sqlx::PgPool,
    store: MemoryBlobStore,
    app: axum::Router,
}

async fn setup() -> Option<TestEnv> {
    if !EphemeralPg::available().await {
        eprintln!("pg_config not on PATH; skipping");
        return None;
    }
    let mut pg = EphemeralPg::new().await.expect("ephemeral pg");
    pg.start().await.expect("pg start");

    let pool = sqlx::PgPool::connect(&pg.connection_url())
        .await
        .expect("connect");
    depot_api::migrate(&pool).await.expect("migrate");

    let store = MemoryBlobStore::new();
    let state = AppState {
        pool: pool.clone(),
        store: Arc::new(store.clone()),
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: pg.connection_url(),
            jwt_secret: JWT_SECRET.into(),
            bcrypt_cost: BCRYPT_COST,
            s3: S3Config {
                endpoint: "http://localhost:9000".into(),
                access_key: "test".into(),
                secret_key: "test".into(),
                bucket: "test".into(),
                region: "us-east-1".into(),
            },
        },
    };
    let app = router(state);

    Some(TestEnv {
        pg,
        pool,
        store,
        app,
    })
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({"email": email, "password": password}).to_string(),
        ))
        .unwrap()
}

fn upload_request(token: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::AUTHORIZATION, token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

#[tokio::test]
async fn full_registry_flow() {
    let Some(mut env) = setup().await else { return };

    provision_user(&env.pool, "alice", "a@b.com", "pw1", BCRYPT_COST)
        .await
        .expect("provision");

    // Login succeeds and the token decodes back to the user.
    let resp = env.app.clone().oneshot(login_request("a@b.com", "pw1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    let session_token = json["token"].as_str().expect("token").to_string();
    let claims = depot_core::auth::jwt::verify_token(&session_token, JWT_SECRET.as_bytes())
        .expect("decodable token");
    assert_eq!(claims.email.as_deref(), Some("a@b.com"));
    let ttl = claims.exp - claims.iat;
    assert_eq!(ttl, 3600);

    // Wrong password and unknown email produce the identical generic error.
    let resp = env.app.clone().oneshot(login_request("a@b.com", "wrong")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let wrong_pw = json_body(resp).await;
    assert_eq!(wrong_pw["message"], "Invalid email or password");

    let resp = env.app.clone().oneshot(login_request("nobody@b.com", "pw1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await, wrong_pw);

    // Profile round-trip.
    let resp = env.app.clone().oneshot(authed("GET", "/profile", &session_token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["profile"]["email"], "a@b.com");
    assert_eq!(json["profile"]["username"], "alice");
    assert!(json["profile"].get("password_hash").is_none());

    // Upload: a 0-byte file and a larger one, both byte-identical in the store.
    let large = vec![0xABu8; 3 * 1024 * 1024];
    let resp = env
        .app
        .clone()
        .oneshot(upload_request(&session_token, "empty.tar", b""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let empty_key = json_body(resp).await["image"]["object_key"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = env
        .app
        .clone()
        .oneshot(upload_request(&session_token, "app.tar", &large))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["image"]["name"], "app.tar");
    assert_eq!(json["image"]["uploaded_by"], "a@b.com");
    let large_id = json["image"]["id"].as_str().unwrap().to_string();
    let large_key = json["image"]["object_key"].as_str().unwrap().to_string();

    assert!(env.store.get(&empty_key).await.unwrap().is_empty());
    assert_eq!(env.store.get(&large_key).await.unwrap().as_ref(), &large[..]);

    // Listing is newest first.
    let resp = env.app.clone().oneshot(authed("GET", "/images", &session_token)).await.unwrap();
    let json = json_body(resp).await;
    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["name"], "app.tar");
    assert_eq!(images[1]["name"], "empty.tar");

    // Point lookup and 404s.
    let resp = env
        .app
        .clone()
        .oneshot(authed("GET", &format!("/images/{large_id}"), &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = env
        .app
        .clone()
        .oneshot(authed("GET", "/images/not-a-real-id", &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Delete removes the object and the row; a second delete sees NotFound.
    let resp = env
        .app
        .clone()
        .oneshot(authed("DELETE", &format!("/images/{large_id}"), &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!env.store.contains(&large_key).await);
    let resp = env
        .app
        .clone()
        .oneshot(authed("GET", &format!("/images/{large_id}"), &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = env
        .app
        .clone()
        .oneshot(authed("DELETE", &format!("/images/{large_id}"), &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Automation tokens: issue, list, use, revoke, reject.
    let resp = env
        .app
        .clone()
        .oneshot(authed("POST", "/generate-token", &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    let token_id = json["token"]["token_id"].as_str().unwrap().to_string();
    let automation_token = json["token"]["token"].as_str().unwrap().to_string();
    assert_eq!(json["token"]["created_by"], "a@b.com");

    let resp = env
        .app
        .clone()
        .oneshot(authed("GET", "/get-all-tokens", &session_token))
        .await
        .unwrap();
    let json = json_body(resp).await;
    assert!(
        json["tokens"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["token_id"] == token_id.as_str())
    );

    // The automation token authorizes requests and uploads as "automation".
    let resp = env
        .app
        .clone()
        .oneshot(upload_request(&automation_token, "bot.tar", b"bot-bytes"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["image"]["uploaded_by"], "automation");

    // Automation callers have no profile row.
    let resp = env
        .app
        .clone()
        .oneshot(authed("GET", "/profile", &automation_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Revocation is effective immediately despite the still-valid signature.
    let resp = env
        .app
        .clone()
        .oneshot(authed("DELETE", &format!("/delete-token/{token_id}"), &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = env
        .app
        .clone()
        .oneshot(authed("GET", "/get-all-tokens", &session_token))
        .await
        .unwrap();
    let json = json_body(resp).await;
    assert!(
        !json["tokens"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["token_id"] == token_id.as_str())
    );
    let resp = env
        .app
        .clone()
        .oneshot(authed("GET", "/images", &automation_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = env
        .app
        .clone()
        .oneshot(authed("DELETE", &format!("/delete-token/{token_id}"), &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Bulk delete clears both stores; a second call finds nothing.
    let resp = env
        .app
        .clone()
        .oneshot(authed("DELETE", "/delete-all-images", &session_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["message"], "All images deleted successfully.");
    assert!(env.store.is_empty().await);

    let resp = env.app.clone().oneshot(authed("GET", "/images", &session_token)).await.unwrap();
    let json = json_body(resp).await;
    assert!(json["images"].as_array().unwrap().is_empty());

    let resp = env
        .app
        .clone()
        .oneshot(authed("DELETE", "/delete-all-images", &session_token))
        .await
        .unwrap();
    let json = json_body(resp).await;
    assert_eq!(json["message"], "No images found to delete.");

    env.pg.stop().await.expect("pg stop");
}

/// Blob store whose `remove` fails for keys containing "poison"; used to
/// exercise the object-removal-failure paths of the pipeline.
#[derive(Clone)]
struct PoisonedStore(MemoryBlobStore);

#[async_trait]
impl BlobStore for PoisonedStore {
    async fn put(&self, key: &str, staging: &Path) -> Result<(), StoreError> {
        self.0.put(key, staging).await
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.0.get(key).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        if key.contains("poison") {
            return Err(StoreError::Remove("simulated outage".into()));
        }
        self.0.remove(key).await
    }
}

#[tokio::test]
async fn failed_object_removal_keeps_the_metadata_row() {
    let Some(mut env) = setup().await else { return };
    let store = PoisonedStore(env.store.clone());
    let identity = Identity::Session {
        user_id: "u-1".into(),
        email: "a@b.com".into(),
    };

    let staging = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(staging.path(), b"data").unwrap();

    let ok = pipeline::ingest(&env.pool, &store, staging.path(), "ok.tar", &identity)
        .await
        .expect("ingest ok.tar");
    let poisoned = pipeline::ingest(&env.pool, &store, staging.path(), "poison.tar", &identity)
        .await
        .expect("ingest poison.tar");

    // Single delete: object removal fails, so the row must survive.
    let err = pipeline::delete(&env.pool, &store, &poisoned.id)
        .await
        .expect_err("delete should fail");
    assert!(matches!(err, ArtifactError::Store(_)));
    pipeline::get(&env.pool, &poisoned.id)
        .await
        .expect("row retained after failed object removal");

    // Bulk delete: the poisoned item is newest and processed first, so the
    // batch aborts before touching the older artifact.
    let err = pipeline::delete_all(&env.pool, &store)
        .await
        .expect_err("delete_all should abort");
    assert!(matches!(err, ArtifactError::Store(_)));
    pipeline::get(&env.pool, &ok.id)
        .await
        .expect("unprocessed row retained after aborted batch");
    assert!(store.get(&ok.object_key).await.is_ok());

    env.pg.stop().await.expect("pg stop");
}
