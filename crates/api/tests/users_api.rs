mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, seed_user, sign_in, PASSWORD};
use serde_json::json;

use authgate_db::CredentialStore;

#[tokio::test]
async fn register_creates_user_with_registration_role() {
    let t = common::build_test_app().await;
    let locality = t.store.insert_locality("Centro", "Norte").await;

    let response = post_json(
        t.app.clone(),
        "/api/v1/public/users/register",
        json!({
            "name": "New Person",
            "email": "New@X.com",
            "password": "long-enough-pw",
            "localityId": locality.id,
            "externalId": "12345678",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["email"], "new@x.com");
    assert_eq!(json["role"], "user");
    assert_eq!(json["externalId"], "12345678");
    assert_eq!(json["locality"]["id"], locality.id);

    // The new account can sign in straight away.
    sign_in(&t.app, "new@x.com", "long-enough-pw").await;
}

#[tokio::test]
async fn register_duplicate_email_is_conflict() {
    let t = common::build_test_app().await;
    seed_user(&t.store, "taken@x.com", Some("user")).await;

    let response = post_json(
        t.app.clone(),
        "/api/v1/public/users/register",
        json!({ "name": "Dup", "email": "TAKEN@x.com", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn register_short_password_fails_validation() {
    let t = common::build_test_app().await;

    let response = post_json(
        t.app.clone(),
        "/api/v1/public/users/register",
        json!({ "name": "Short", "email": "short@x.com", "password": "1234567" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn register_unknown_locality_fails_validation() {
    let t = common::build_test_app().await;

    let response = post_json(
        t.app.clone(),
        "/api/v1/public/users/register",
        json!({
            "name": "Lost",
            "email": "lost@x.com",
            "password": "long-enough-pw",
            "localityId": 999,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(t.store.find_user_by_email("lost@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn register_without_registration_role_creates_blocked_account() {
    let mut env = common::test_env();
    env.insert("REGISTRATION_ROLE", "missing-role".into());
    let t = common::build_test_app_with(common::config_from(&env)).await;

    let response = post_json(
        t.app.clone(),
        "/api/v1/public/users/register",
        json!({ "name": "Nobody", "email": "nobody@x.com", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_json(response).await["role"].is_null());

    let response = post_json(
        t.app.clone(),
        "/api/v1/auth/sign-in",
        json!({ "email": "nobody@x.com", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "ACCOUNT_BLOCKED");
}

#[tokio::test]
async fn check_reports_taken_identifiers() {
    let t = common::build_test_app().await;
    seed_user(&t.store, "a@x.com", Some("user")).await;

    let response = post_json(
        t.app.clone(),
        "/api/v1/public/users/check",
        json!({ "email": "A@x.com", "userIdentifier": "nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["exists"], true);
    assert_eq!(json["emailExists"], true);
    assert_eq!(json["userIdentifierExists"], false);

    let response = post_json(
        t.app.clone(),
        "/api/v1/public/users/check",
        json!({ "email": "free@x.com" }),
    )
    .await;
    assert_eq!(body_json(response).await["exists"], false);
}

#[tokio::test]
async fn get_user_by_id() {
    let t = common::build_test_app().await;
    let other = seed_user(&t.store, "other@x.com", Some("admin")).await;
    seed_user(&t.store, "me@x.com", Some("user")).await;
    let (access, _) = sign_in(&t.app, "me@x.com", PASSWORD).await;

    let response = get_auth(
        t.app.clone(),
        &format!("/api/v1/users/{}", other.id),
        &access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["email"], "other@x.com");
    assert_eq!(json["role"], "admin");
}

#[tokio::test]
async fn get_missing_user_is_not_found() {
    let t = common::build_test_app().await;
    seed_user(&t.store, "me@x.com", Some("user")).await;
    let (access, _) = sign_in(&t.app, "me@x.com", PASSWORD).await;

    let response = get_auth(t.app.clone(), "/api/v1/users/4242", &access).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "User with id 4242 not found");
}

#[tokio::test]
async fn list_roles_requires_session() {
    let t = common::build_test_app().await;
    seed_user(&t.store, "me@x.com", Some("user")).await;

    let response = common::get(t.app.clone(), "/api/v1/roles").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (access, _) = sign_in(&t.app, "me@x.com", PASSWORD).await;
    let response = get_auth(t.app.clone(), "/api/v1/roles", &access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["admin", "user"]);
}
