#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use authgate_api::auth::password::hash_password;
use authgate_api::config::ServerConfig;
use authgate_api::router::build_app_router;
use authgate_api::state::AppState;
use authgate_db::models::user::{CreateUser, User};
use authgate_db::{CredentialStore, MemoryStore};
use authgate_mail::MemoryMailer;

pub const PASSWORD: &str = "correct-horse-42";

/// Everything a test needs to drive the app and inspect its collaborators.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<MemoryMailer>,
}

/// Environment for a test `ServerConfig`. Upstreams point at a closed port.
pub fn test_env() -> HashMap<&'static str, String> {
    [
        ("DATABASE_URL", "postgres://unused"),
        ("JWT_SECRET", "integration-test-secret"),
        ("JWT_SECRET_EXPIRES_IN", "15m"),
        ("JWT_SECRET_EXPIRES_REFRESH_IN", "7d"),
        ("URL_GATEWAY", "http://127.0.0.1:9"),
        ("URL_MS_REPORTS", "http://127.0.0.1:9"),
        ("URL_MS_S3", "http://127.0.0.1:9"),
        ("S3_ENDPOINT", "http://minio:9000"),
        ("S3_REGION", "us-east-1"),
        ("S3_ACCESS_KEY_ID", "access-key"),
        ("S3_SECRET_ACCESS_KEY", "secret-key"),
        ("S3_URL", "http://cdn.local"),
        ("S3_ACCESS_BUCKET", "uploads"),
        ("APIKEY_S3", "files-api-key"),
        ("THROTTLE_TTL", "60000"),
        ("THROTTLE_LIMIT", "1000"),
        ("RECOVERY_PASSWORD_PUBLIC_URL", "https://app.local/recover"),
        ("CONTACT_INBOX", "inbox@app.local"),
        ("APP_NAME", "Authgate"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect()
}

pub fn config_from(env: &HashMap<&'static str, String>) -> ServerConfig {
    ServerConfig::from_lookup(|key| env.get(key).cloned()).expect("test config must load")
}

/// Build the full application router over an in-memory store seeded with
/// the `admin` and `user` roles.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(config_from(&test_env())).await
}

pub async fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_role("admin", &["users.read", "users.write", "reports.read"])
        .await;
    store.insert_role("user", &["reports.read", "files.read"]).await;
    let mailer = Arc::new(MemoryMailer::new());

    let state = AppState::new(config, store.clone(), mailer.clone()).expect("state must build");
    let app = build_app_router(state.clone());
    TestApp {
        app,
        state,
        store,
        mailer,
    }
}

/// Insert a user with [`PASSWORD`] and the named role (`None` = blocked).
pub async fn seed_user(store: &MemoryStore, email: &str, role: Option<&str>) -> User {
    let role_id = match role {
        Some(name) => Some(
            store
                .find_role_by_name(name)
                .await
                .unwrap()
                .expect("role must be seeded")
                .id,
        ),
        None => None,
    };
    store
        .create_user(&CreateUser {
            name: "Test User".into(),
            email: email.into(),
            password_hash: hash_password(PASSWORD).unwrap(),
            role_id,
            locality_id: None,
            external_id: None,
        })
        .await
        .unwrap()
}

/// Sign in through the API and return `(accessToken, refreshToken)`.
pub async fn sign_in(app: &Router, email: &str, password: &str) -> (String, String) {
    let response = post_json(
        app.clone(),
        "/api/v1/auth/sign-in",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), 200, "sign-in should succeed");
    let json = body_json(response).await;
    (
        json["accessToken"].as_str().unwrap().to_string(),
        json["refreshToken"].as_str().unwrap().to_string(),
    )
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
