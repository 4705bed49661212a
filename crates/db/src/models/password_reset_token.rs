//! Password reset token model and DTO.

use authgate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `password_reset_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub token: String,
    pub user_id: DbId,
    pub used: bool,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl PasswordResetToken {
    /// A token can be redeemed only once and only before it expires.
    pub fn is_redeemable(&self, now: Timestamp) -> bool {
        !self.used && self.expires_at > now
    }
}

/// DTO for issuing a new reset token.
#[derive(Debug, Clone)]
pub struct CreatePasswordResetToken {
    pub token: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn token(used: bool, expires_in: Duration) -> PasswordResetToken {
        let now = Utc::now();
        PasswordResetToken {
            token: "abc".into(),
            user_id: 1,
            used,
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[test]
    fn fresh_token_is_redeemable() {
        assert!(token(false, Duration::minutes(5)).is_redeemable(Utc::now()));
    }

    #[test]
    fn used_token_is_not_redeemable() {
        assert!(!token(true, Duration::minutes(5)).is_redeemable(Utc::now()));
    }

    #[test]
    fn expired_token_is_not_redeemable() {
        assert!(!token(false, Duration::minutes(-1)).is_redeemable(Utc::now()));
    }
}
