use crate::types::DbId;

/// Message returned whenever an account cannot be used to open a session.
///
/// Session persistence failures surface with the same text.
pub const ACCOUNT_BLOCKED_MESSAGE: &str =
    "The user is blocked, please contact your administrator.";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Account blocked")]
    AccountBlocked,

    #[error("Invalid or expired password reset token")]
    InvalidOrExpiredToken,

    #[error("Internal error: {0}")]
    Internal(String),
}
