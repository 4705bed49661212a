use authgate_core::error::{CoreError, ACCOUNT_BLOCKED_MESSAGE};
use authgate_db::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `authgate_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage error from `authgate_db`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Too many requests")]
    TooManyRequests,

    /// The upstream service failed or could not be reached.
    #[error("Upstream {upstream} failed: {message}")]
    BadGateway {
        upstream: &'static str,
        message: String,
    },

    /// The upstream service did not answer within its timeout.
    #[error("Upstream {upstream} timed out")]
    GatewayTimeout { upstream: &'static str },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::AccountBlocked => (
                    StatusCode::BAD_REQUEST,
                    "ACCOUNT_BLOCKED",
                    ACCOUNT_BLOCKED_MESSAGE.to_string(),
                ),
                CoreError::InvalidOrExpiredToken => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_OR_EXPIRED_TOKEN",
                    core.to_string(),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Storage errors ---
            AppError::Store(StoreError::Duplicate(field)) => (
                StatusCode::BAD_REQUEST,
                "CONFLICT",
                format!("A record with this {field} already exists"),
            ),
            AppError::Store(StoreError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "TOO_MANY_REQUESTS",
                "Too many requests, slow down".to_string(),
            ),
            AppError::BadGateway { upstream, message } => {
                tracing::error!(upstream, error = %message, "Upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "BAD_GATEWAY",
                    format!("Upstream service '{upstream}' is unavailable"),
                )
            }
            AppError::GatewayTimeout { upstream } => {
                tracing::error!(upstream, "Upstream request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "GATEWAY_TIMEOUT",
                    format!("Upstream service '{upstream}' timed out"),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
