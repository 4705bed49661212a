//! Handlers for requesting and redeeming password reset tokens.

use authgate_core::email::normalize;
use authgate_core::error::CoreError;
use authgate_db::models::password_reset_token::CreatePasswordResetToken;
use authgate_mail::{templates, OutgoingEmail};
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::json::ValidatedJson;
use crate::state::AppState;

/// Random bytes per reset token (rendered as twice as many hex chars).
const RESET_TOKEN_BYTES: usize = 20;

#[derive(Debug, Deserialize, Validate)]
pub struct RequestPasswordResetRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 20 random bytes, hex encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// POST /api/v1/auth/request-password-reset
///
/// Always answers 200 once the body is valid, whether or not the email exists.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RequestPasswordResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    let response = Json(MessageResponse {
        message: "If the email is registered, a reset link has been sent.".into(),
    });

    let Some(user) = state.store.find_user_by_email(&normalize(&input.email)).await? else {
        tracing::warn!("Password reset requested for an unregistered email");
        return Ok(response);
    };

    let token = generate_reset_token();
    state
        .store
        .create_reset_token(&CreatePasswordResetToken {
            token: token.clone(),
            user_id: user.id,
            expires_at: Utc::now() + state.config.password_reset_expiry,
        })
        .await?;

    let reset_url = format!("{}/{token}", state.config.recovery_password_url);
    let (subject, html) = templates::password_reset(&state.config.branding, &user.name, &reset_url);
    let email = OutgoingEmail {
        to: user.email.clone(),
        reply_to: None,
        subject,
        html,
    };
    if let Err(e) = state.mailer.send(email).await {
        tracing::error!(error = %e, user_id = user.id, "Failed to send password reset email");
    } else {
        tracing::info!(user_id = user.id, "Password reset email sent");
    }

    Ok(response)
}

/// POST /api/v1/auth/reset-password
///
/// Redeem a reset token, store the new password, and close all sessions.
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {

    let row = state
        .store
        .find_reset_token(&input.token)
        .await?
        .filter(|row| row.is_redeemable(Utc::now()))
        .ok_or(CoreError::InvalidOrExpiredToken)?;
    state
        .store
        .find_user_by_id(row.user_id)
        .await?
        .ok_or(CoreError::InvalidOrExpiredToken)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // The conditional update loses any race with a concurrent redeem.
    if !state
        .store
        .redeem_reset_token(&input.token, &password_hash)
        .await?
    {
        return Err(CoreError::InvalidOrExpiredToken.into());
    }

    if let Err(e) = state.sessions.deactivate_all_sessions(row.user_id).await {
        tracing::error!(error = %e, user_id = row.user_id, "Failed to close sessions after reset");
    }

    tracing::info!(user_id = row.user_id, "Password reset completed");
    Ok(Json(MessageResponse {
        message: "Password updated successfully.".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_token_is_forty_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }
}
