pub mod auth;
pub mod health;
pub mod proxy;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/sign-in                       sign in (public)
/// /auth/refresh                       refresh tokens (public)
/// /auth/sign-out                      close all sessions
/// /auth/request-password-reset        email a reset link (public)
/// /auth/reset-password                redeem a reset token (public)
///
/// /public/users/register              self-registration (public)
/// /public/users/check                 email / identifier availability (public)
/// /users/me                           caller's profile
/// /users/{id}                         user profile
/// /roles                              roles with permissions
///
/// /contact/send                       contact form (public)
///
/// /gateway/*                          -> URL_GATEWAY
/// /reports/*                          -> URL_MS_REPORTS
/// /files/*                            -> URL_MS_S3
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(users::router())
        .route("/roles", get(handlers::roles::list_roles))
        .route("/contact/send", post(handlers::contact::send))
        .merge(proxy::router())
}
