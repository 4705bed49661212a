//! Repository for the `roles` table and its permission assignments.

use authgate_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::Role;

/// Select list + joins that aggregate permission names in assignment order.
const SELECT_WITH_PERMISSIONS: &str = "SELECT r.id, r.name,
        COALESCE(
            ARRAY_AGG(p.name ORDER BY rp.position, p.id) FILTER (WHERE p.id IS NOT NULL),
            ARRAY[]::TEXT[]
        ) AS permissions
     FROM roles r
     LEFT JOIN role_permissions rp ON rp.role_id = r.id
     LEFT JOIN permissions p ON p.id = rp.permission_id";

/// Provides read operations for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Find a role (with permissions) by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("{SELECT_WITH_PERMISSIONS} WHERE r.id = $1 GROUP BY r.id, r.name");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role (with permissions) by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("{SELECT_WITH_PERMISSIONS} WHERE r.name = $1 GROUP BY r.id, r.name");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("{SELECT_WITH_PERMISSIONS} GROUP BY r.id, r.name ORDER BY r.id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }
}
