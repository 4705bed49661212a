//! Locality (municipality) entity model.

use authgate_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `localities` table.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Locality {
    pub id: DbId,
    pub name: String,
    pub province: String,
}
