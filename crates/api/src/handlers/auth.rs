//! Handlers for the `/auth` resource (sign-in, refresh, sign-out).

use authgate_core::email::normalize;
use authgate_core::error::CoreError;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{Payload, TokenPair};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ValidatedJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/sign-in`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub success: bool,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Incorrect user or password.".into()))
}

fn invalid_token() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid token.".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/sign-in
///
/// Authenticate with email + password. Opens a new session, closing any
/// previous one, and returns an access/refresh token pair.
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SignInRequest>,
) -> AppResult<Json<TokenPair>> {

    let user = state
        .store
        .find_user_by_email(&normalize(&input.email))
        .await?
        .ok_or_else(invalid_credentials)?;

    let Some(role_id) = user.role_id else {
        tracing::warn!(user_id = user.id, "Sign-in attempt on blocked account");
        return Err(CoreError::AccountBlocked.into());
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    let role = state
        .store
        .find_role(role_id)
        .await?
        .ok_or(CoreError::AccountBlocked)?;

    let payload = Payload::new(&user, &role);
    if let Err(e) = state.sessions.create_active_session(&payload).await {
        tracing::error!(error = %e, user_id = user.id, "Failed to persist session");
        return Err(CoreError::AccountBlocked.into());
    }

    let pair = state
        .signer
        .sign_pair(&payload)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::info!(user_id = user.id, role = %role.name, "User signed in");
    Ok(Json(pair))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for a new pair bound to the same session.
/// Answers only with a token pair or 401.
pub async fn refresh(
    State(state): State<AppState>,
    input: Result<ValidatedJson<RefreshRequest>, AppError>,
) -> AppResult<Json<TokenPair>> {
    // Any unusable body is just another invalid token.
    let ValidatedJson(input) = input.map_err(|_| invalid_token())?;

    state
        .signer
        .verify(&input.refresh_token)
        .map_err(|_| invalid_token())?;
    let claims = state
        .signer
        .decode(&input.refresh_token)
        .map_err(|_| invalid_token())?;

    let account = state
        .sessions
        .resolve_session(&claims.payload)
        .await?
        .ok_or_else(invalid_token)?;
    let role = account.role.ok_or(CoreError::AccountBlocked)?;

    let payload = Payload::with_value(&account.user, &role, claims.payload.value);
    if let Err(e) = state.sessions.refresh_active_session(&payload).await {
        tracing::error!(error = %e, user_id = payload.id, "Failed to refresh session");
        return Err(CoreError::AccountBlocked.into());
    }

    let pair = state
        .signer
        .sign_pair(&payload)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::debug!(user_id = payload.id, "Session tokens refreshed");
    Ok(Json(pair))
}

/// POST /api/v1/auth/sign-out
///
/// Deactivate every session of the caller.
pub async fn sign_out(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<SignOutResponse>> {
    let success = state
        .sessions
        .deactivate_all_sessions(auth_user.user_id)
        .await?;
    Ok(Json(SignOutResponse { success }))
}
