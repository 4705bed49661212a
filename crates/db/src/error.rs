/// Error type returned by every [`CredentialStore`](crate::CredentialStore) operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write. Carries the offending field.
    #[error("Duplicate value for {0}")]
    Duplicate(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// PostgreSQL unique violation.
const UNIQUE_VIOLATION: &str = "23505";

impl StoreError {
    /// Map a sqlx error, turning a violation of `constraint` into
    /// [`StoreError::Duplicate`] for `field`.
    pub(crate) fn from_unique(err: sqlx::Error, constraint: &str, field: &'static str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
            {
                return StoreError::Duplicate(field);
            }
        }
        StoreError::Database(err)
    }
}
