use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// User routes. Public ones live under `/public/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/public/users/register", post(users::register))
        .route("/public/users/check", post(users::check))
        .route("/users/me", get(users::me))
        .route("/users/{id}", get(users::get_user))
}
