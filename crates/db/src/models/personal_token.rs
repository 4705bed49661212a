//! Session record ("personal token") model.

use authgate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session record row from the `personal_tokens` table.
///
/// `token` holds the random value embedded in the signed session token.
#[derive(Debug, Clone, FromRow)]
pub struct PersonalToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub last_session: Timestamp,
    /// Lockout signal. Any nonzero value makes the record unusable.
    pub attempts: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PersonalToken {
    /// Whether this record can back an authenticated request.
    pub fn is_usable(&self) -> bool {
        self.active && self.attempts == 0
    }
}
