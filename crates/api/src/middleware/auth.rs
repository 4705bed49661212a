//! Session authentication middleware and extractor.

use authgate_core::error::CoreError;
use authgate_core::types::DbId;
use authgate_db::models::user::UserAccount;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::gate::Admission;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved by the auth gate.
///
/// Use this as an extractor parameter in any handler behind a protected route:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
    /// Role name, `None` if the role vanished after sign-in.
    pub role: Option<String>,
    /// Session value of the token that authenticated this request.
    pub session: String,
    /// Account snapshot loaded while resolving the session.
    pub account: UserAccount,
}

impl AuthUser {
    pub fn from_account(account: UserAccount, session: String) -> Self {
        Self {
            user_id: account.user.id,
            role: account.role.as_ref().map(|r| r.name.clone()),
            session,
            account,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Authentication required".into()))
        })
    }
}

/// Admit the request through the auth gate, attaching [`AuthUser`] on success.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    match state.gate.admit(&path, request.headers()).await {
        Ok(Admission::Public) => next.run(request).await,
        Ok(Admission::Authenticated(user)) => {
            tracing::debug!(user_id = user.user_id, %path, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(%path, "Request rejected by auth gate");
            err.into_response()
        }
    }
}
