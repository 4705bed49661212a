//! Server-side session records bound to token payloads.
//!
//! A signed token is only honoured while the user's single active record
//! carries the token's `value` and has a zero attempts counter.

use std::sync::Arc;

use authgate_core::types::DbId;
use authgate_db::models::user::UserAccount;
use authgate_db::{CredentialStore, StoreResult};

use super::jwt::Payload;

/// Creates, refreshes, resolves and revokes session records.
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<dyn CredentialStore>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Replace every active record of the payload's user with a new one
    /// carrying `payload.value`.
    pub async fn create_active_session(&self, payload: &Payload) -> StoreResult<()> {
        let record = self
            .store
            .activate_session(payload.id, &payload.value)
            .await?;
        tracing::info!(user_id = payload.id, session_id = record.id, "Session created");
        Ok(())
    }

    /// Stamp the user's active record, or create one from `payload.value`.
    pub async fn refresh_active_session(&self, payload: &Payload) -> StoreResult<()> {
        let record = self.store.renew_session(payload.id, &payload.value).await?;
        tracing::debug!(user_id = payload.id, session_id = record.id, "Session refreshed");
        Ok(())
    }

    /// Resolve the account behind a verified payload.
    ///
    /// When the record is missing, inactive, locked by attempts, or owned by
    /// another user, every active record of `payload.id` is revoked and
    /// `None` is returned.
    pub async fn resolve_session(&self, payload: &Payload) -> StoreResult<Option<UserAccount>> {
        let record = self.store.find_session(&payload.value).await?;
        let usable = record
            .as_ref()
            .is_some_and(|r| r.is_usable() && r.user_id == payload.id);

        if !usable {
            let revoked = self.store.deactivate_sessions(payload.id).await?;
            tracing::warn!(user_id = payload.id, revoked, "Session rejected, active records revoked");
            return Ok(None);
        }

        self.store.find_account(payload.id).await
    }

    /// Deactivate all of a user's records. Returns whether any changed.
    pub async fn deactivate_all_sessions(&self, user_id: DbId) -> StoreResult<bool> {
        let affected = self.store.deactivate_sessions(user_id).await?;
        tracing::info!(user_id, affected, "Sessions deactivated");
        Ok(affected > 0)
    }
}
