//! Handlers for user registration, existence checks and profile lookup.

use authgate_core::email::normalize;
use authgate_core::error::CoreError;
use authgate_core::types::DbId;
use authgate_db::models::user::{CreateUser, UserAccount, UserProfile};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub password: String,
    pub locality_id: Option<DbId>,
    #[validate(length(min = 1, max = 32))]
    pub external_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub user_identifier: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub exists: bool,
    pub user_identifier_exists: bool,
    pub email_exists: bool,
}

/// POST /api/v1/public/users/register
///
/// Self-registration. The new user gets the configured registration role;
/// when that role does not exist the account is created blocked.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = state
        .store
        .find_role_by_name(&state.config.registration_role)
        .await?;
    if role.is_none() {
        tracing::warn!(
            role = %state.config.registration_role,
            "Registration role missing, creating blocked account"
        );
    }

    let locality = match input.locality_id {
        Some(id) => Some(state.store.find_locality(id).await?.ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown locality {id}")))
        })?),
        None => None,
    };

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = state
        .store
        .create_user(&CreateUser {
            name: input.name.trim().to_string(),
            email: normalize(&input.email),
            password_hash,
            role_id: role.as_ref().map(|r| r.id),
            locality_id: locality.as_ref().map(|l| l.id),
            external_id: input.external_id.map(|id| id.trim().to_string()),
        })
        .await?;

    tracing::info!(user_id = user.id, "User registered");
    let account = UserAccount {
        user,
        role,
        locality,
    };
    Ok((StatusCode::CREATED, Json(account.profile())))
}

/// POST /api/v1/public/users/check
///
/// Report whether an external identifier and/or email are already taken.
pub async fn check(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CheckRequest>,
) -> AppResult<Json<CheckResponse>> {
    let user_identifier_exists = match input.user_identifier.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => state.store.find_user_by_external_id(id).await?.is_some(),
        _ => false,
    };
    let email_exists = match input.email.as_deref().map(normalize) {
        Some(email) if !email.is_empty() => state.store.find_user_by_email(&email).await?.is_some(),
        _ => false,
    };

    Ok(Json(CheckResponse {
        exists: user_identifier_exists || email_exists,
        user_identifier_exists,
        email_exists,
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserProfile>> {
    let account = state
        .store
        .find_account(id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(account.profile()))
}

/// GET /api/v1/users/me
pub async fn me(auth: AuthUser) -> Json<UserProfile> {
    Json(auth.account.profile())
}
