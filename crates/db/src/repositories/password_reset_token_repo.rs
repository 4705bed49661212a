//! Repository for the `password_reset_tokens` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::password_reset_token::{CreatePasswordResetToken, PasswordResetToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "token, user_id, used, expires_at, created_at";

/// Provides issue / lookup / redeem operations for reset tokens.
pub struct PasswordResetTokenRepo;

impl PasswordResetTokenRepo {
    /// Insert a new unused token, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePasswordResetToken,
    ) -> Result<PasswordResetToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO password_reset_tokens (token, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(&input.token)
            .bind(input.user_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a token row by its token string.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM password_reset_tokens WHERE token = $1");
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Flip `used` to true if the token is still unused and unexpired.
    ///
    /// Returns the row when this call performed the flip, `None` otherwise.
    pub async fn mark_used<'e, E: PgExecutor<'e>>(
        executor: E,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        let query = format!(
            "UPDATE password_reset_tokens SET used = true
             WHERE token = $1 AND used = false AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(token)
            .fetch_optional(executor)
            .await
    }
}
