//! User entity model and DTOs.

use authgate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::locality::Locality;
use super::role::Role;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserProfile`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// `None` means the account is blocked.
    pub role_id: Option<DbId>,
    pub locality_id: Option<DbId>,
    /// National identity document number, when provided at registration.
    pub external_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A user together with its resolved role and locality.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub role: Option<Role>,
    pub locality: Option<Locality>,
}

impl UserAccount {
    /// Build the safe, serializable view of this account.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user.id,
            name: self.user.name.clone(),
            email: self.user.email.clone(),
            role: self.role.as_ref().map(|r| r.name.clone()),
            permissions: self
                .role
                .as_ref()
                .map(|r| r.permissions.clone())
                .unwrap_or_default(),
            locality: self.locality.clone(),
            external_id: self.user.external_id.clone(),
            created_at: self.user.created_at,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub locality: Option<Locality>,
    pub external_id: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<DbId>,
    pub locality_id: Option<DbId>,
    pub external_id: Option<String>,
}
