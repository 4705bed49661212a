//! Repository for the `personal_tokens` table (server-side session records).

use authgate_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::personal_token::PersonalToken;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token, last_session, attempts, active, created_at, updated_at";

/// Provides session record operations. Every function accepts any executor so
/// callers can run them inside a transaction.
pub struct PersonalTokenRepo;

impl PersonalTokenRepo {
    /// Insert a fresh active record (`attempts = 0`) for `user_id`.
    pub async fn insert_active<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: DbId,
        token: &str,
    ) -> Result<PersonalToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO personal_tokens (user_id, token, last_session, attempts, active)
             VALUES ($1, $2, NOW(), 0, true)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PersonalToken>(&query)
            .bind(user_id)
            .bind(token)
            .fetch_one(executor)
            .await
    }

    /// Find the most recent record carrying `token`, active or not.
    pub async fn find_by_token<'e, E: PgExecutor<'e>>(
        executor: E,
        token: &str,
    ) -> Result<Option<PersonalToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM personal_tokens
             WHERE token = $1
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, PersonalToken>(&query)
            .bind(token)
            .fetch_optional(executor)
            .await
    }

    /// Stamp the user's active record with a new `last_session` and clear its
    /// attempts counter. The token value is left untouched.
    ///
    /// Returns `None` when the user has no active record.
    pub async fn touch_active<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: DbId,
    ) -> Result<Option<PersonalToken>, sqlx::Error> {
        let query = format!(
            "UPDATE personal_tokens
             SET last_session = NOW(), attempts = 0, updated_at = NOW()
             WHERE user_id = $1 AND active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PersonalToken>(&query)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Deactivate every active record of a user. Returns the affected count.
    pub async fn deactivate_all_for_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE personal_tokens SET active = false, updated_at = NOW()
             WHERE user_id = $1 AND active = true",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
