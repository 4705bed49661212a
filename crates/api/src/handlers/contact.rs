//! Contact form handler.

use authgate_mail::{templates, OutgoingEmail};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use super::password_reset::MessageResponse;
use crate::error::AppResult;
use crate::middleware::json::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "Message is required"))]
    pub text: String,
}

/// POST /api/v1/contact/send
///
/// Forward the message to the contact inbox. Delivery problems are logged,
/// never reported to the sender.
pub async fn send(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ContactRequest>,
) -> AppResult<Json<MessageResponse>> {

    match &state.config.contact_inbox {
        Some(inbox) => {
            let (subject, html) = templates::contact_message(
                &state.config.branding,
                &input.email,
                &input.name,
                input.subject.as_deref(),
                &input.text,
            );
            let email = OutgoingEmail {
                to: inbox.clone(),
                reply_to: Some(input.email.clone()),
                subject,
                html,
            };
            if let Err(e) = state.mailer.send(email).await {
                tracing::error!(error = %e, "Failed to deliver contact message");
            }
        }
        None => tracing::warn!("CONTACT_INBOX not configured, contact message dropped"),
    }

    Ok(Json(MessageResponse {
        message: "Message sent successfully.".into(),
    }))
}
