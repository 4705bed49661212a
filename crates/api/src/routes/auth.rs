//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::{auth, password_reset};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /sign-in                 -> sign_in
/// POST /refresh                 -> refresh
/// POST /sign-out                -> sign_out (requires auth)
/// POST /request-password-reset  -> request_password_reset
/// POST /reset-password          -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(auth::sign_in))
        .route("/refresh", post(auth::refresh))
        .route("/sign-out", post(auth::sign_out))
        .route(
            "/request-password-reset",
            post(password_reset::request_password_reset),
        )
        .route("/reset-password", post(password_reset::reset_password))
}
