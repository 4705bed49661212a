//! Role entity model.

use authgate_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A role with its permission names, in `role_permissions.position` order.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub permissions: Vec<String>,
}
