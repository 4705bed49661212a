//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

use authgate_api::error::AppError;
use authgate_core::error::CoreError;
use authgate_db::StoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "User",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "User with id 42 not found");
}

#[tokio::test]
async fn conflict_returns_400() {
    let err = AppError::Core(CoreError::Conflict("duplicate name".into()));

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "duplicate name");
}

#[tokio::test]
async fn duplicate_store_write_returns_conflict() {
    let err = AppError::Store(StoreError::Duplicate("email"));

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "A record with this email already exists");
}

#[tokio::test]
async fn unauthorized_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("Invalid token.".into()));

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Invalid token.");
}

#[tokio::test]
async fn blocked_account_returns_fixed_message() {
    let (status, json) = error_to_response(AppError::Core(CoreError::AccountBlocked)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "ACCOUNT_BLOCKED");
    assert_eq!(
        json["error"],
        "The user is blocked, please contact your administrator."
    );
}

#[tokio::test]
async fn invalid_reset_token_returns_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::InvalidOrExpiredToken)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_OR_EXPIRED_TOKEN");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn core_internal_is_sanitized() {
    let err = AppError::Core(CoreError::Internal("pool exhausted".into()));

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn too_many_requests_returns_429() {
    let (status, json) = error_to_response(AppError::TooManyRequests).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "TOO_MANY_REQUESTS");
}

#[tokio::test]
async fn upstream_failures_hide_details() {
    let err = AppError::BadGateway {
        upstream: "reports",
        message: "connection refused to 10.0.0.5:8080".into(),
    };
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "BAD_GATEWAY");
    assert!(!json["error"].as_str().unwrap().contains("10.0.0.5"));

    let (status, json) =
        error_to_response(AppError::GatewayTimeout { upstream: "files" }).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "GATEWAY_TIMEOUT");
}
