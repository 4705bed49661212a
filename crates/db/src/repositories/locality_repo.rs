//! Repository for the `localities` table.

use authgate_core::types::DbId;
use sqlx::PgPool;

use crate::models::locality::Locality;

/// Provides read operations for localities.
pub struct LocalityRepo;

impl LocalityRepo {
    /// Find a locality by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Locality>, sqlx::Error> {
        sqlx::query_as::<_, Locality>("SELECT id, name, province FROM localities WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
