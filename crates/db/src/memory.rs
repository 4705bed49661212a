//! In-process [`CredentialStore`] for tests and local experiments.
//!
//! All state sits behind one mutex, so session operations are trivially
//! serialized per user.

use std::collections::HashMap;

use async_trait::async_trait;
use authgate_core::types::DbId;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::models::locality::Locality;
use crate::models::password_reset_token::{CreatePasswordResetToken, PasswordResetToken};
use crate::models::personal_token::PersonalToken;
use crate::models::role::Role;
use crate::models::user::{CreateUser, User};
use crate::store::CredentialStore;

#[derive(Default)]
struct State {
    next_id: DbId,
    users: Vec<User>,
    roles: Vec<Role>,
    localities: Vec<Locality>,
    sessions: Vec<PersonalToken>,
    reset_tokens: HashMap<String, PasswordResetToken>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn deactivate_sessions(&mut self, user_id: DbId) -> u64 {
        let now = Utc::now();
        let mut affected = 0;
        for record in self
            .sessions
            .iter_mut()
            .filter(|s| s.user_id == user_id && s.active)
        {
            record.active = false;
            record.updated_at = now;
            affected += 1;
        }
        affected
    }

    fn insert_session(&mut self, user_id: DbId, token: &str) -> PersonalToken {
        let now = Utc::now();
        let record = PersonalToken {
            id: self.next_id(),
            user_id,
            token: token.to_string(),
            last_session: now,
            attempts: 0,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.sessions.push(record.clone());
        record
    }
}

/// A [`CredentialStore`] that keeps every row in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a role with the given permission names (in order).
    pub async fn insert_role(&self, name: &str, permissions: &[&str]) -> Role {
        let mut state = self.state.lock().await;
        let role = Role {
            id: state.next_id(),
            name: name.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        };
        state.roles.push(role.clone());
        role
    }

    /// Seed a locality.
    pub async fn insert_locality(&self, name: &str, province: &str) -> Locality {
        let mut state = self.state.lock().await;
        let locality = Locality {
            id: state.next_id(),
            name: name.to_string(),
            province: province.to_string(),
        };
        state.localities.push(locality.clone());
        locality
    }

    /// Every session record of `user_id`, oldest first.
    pub async fn sessions_for_user(&self, user_id: DbId) -> Vec<PersonalToken> {
        let state = self.state.lock().await;
        state
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Overwrite the attempts counter of every record carrying `token`.
    pub async fn set_session_attempts(&self, token: &str, attempts: i32) {
        let mut state = self.state.lock().await;
        for record in state.sessions.iter_mut().filter(|s| s.token == token) {
            record.attempts = attempts;
        }
    }

    /// Every reset token issued for `user_id`.
    pub async fn reset_tokens_for_user(&self, user_id: DbId) -> Vec<PasswordResetToken> {
        let state = self.state.lock().await;
        state
            .reset_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Move a reset token's expiry, e.g. into the past.
    pub async fn set_reset_token_expiry(&self, token: &str, expires_at: chrono::DateTime<Utc>) {
        let mut state = self.state.lock().await;
        if let Some(row) = state.reset_tokens.get_mut(token) {
            row.expires_at = expires_at;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == input.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role_id: input.role_id,
            locality_id: input.locality_id,
            external_id: input.external_id.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn find_role(&self, id: DbId) -> StoreResult<Option<Role>> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let state = self.state.lock().await;
        Ok(state.roles.clone())
    }

    async fn find_locality(&self, id: DbId) -> StoreResult<Option<Locality>> {
        let state = self.state.lock().await;
        Ok(state.localities.iter().find(|l| l.id == id).cloned())
    }

    async fn activate_session(&self, user_id: DbId, token: &str) -> StoreResult<PersonalToken> {
        let mut state = self.state.lock().await;
        state.deactivate_sessions(user_id);
        Ok(state.insert_session(user_id, token))
    }

    async fn renew_session(&self, user_id: DbId, token: &str) -> StoreResult<PersonalToken> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        if let Some(record) = state
            .sessions
            .iter_mut()
            .find(|s| s.user_id == user_id && s.active)
        {
            record.last_session = now;
            record.attempts = 0;
            record.updated_at = now;
            return Ok(record.clone());
        }
        Ok(state.insert_session(user_id, token))
    }

    async fn find_session(&self, token: &str) -> StoreResult<Option<PersonalToken>> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .iter()
            .filter(|s| s.token == token)
            .max_by_key(|s| s.id)
            .cloned())
    }

    async fn deactivate_sessions(&self, user_id: DbId) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.deactivate_sessions(user_id))
    }

    async fn create_reset_token(
        &self,
        input: &CreatePasswordResetToken,
    ) -> StoreResult<PasswordResetToken> {
        let mut state = self.state.lock().await;
        if state.reset_tokens.contains_key(&input.token) {
            return Err(StoreError::Duplicate("token"));
        }
        let row = PasswordResetToken {
            token: input.token.clone(),
            user_id: input.user_id,
            used: false,
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };
        state.reset_tokens.insert(row.token.clone(), row.clone());
        Ok(row)
    }

    async fn find_reset_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>> {
        let state = self.state.lock().await;
        Ok(state.reset_tokens.get(token).cloned())
    }

    async fn redeem_reset_token(&self, token: &str, password_hash: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let Some(user_id) = state
            .reset_tokens
            .get(token)
            .filter(|row| row.is_redeemable(now))
            .map(|row| row.user_id)
        else {
            return Ok(false);
        };
        let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        user.updated_at = now;

        if let Some(row) = state.reset_tokens.get_mut(token) {
            row.used = true;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn seeded() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let role = store.insert_role("user", &["reports.read"]).await;
        let user = store
            .create_user(&CreateUser {
                name: "Ana".into(),
                email: "ana@x.com".into(),
                password_hash: "hash".into(),
                role_id: Some(role.id),
                locality_id: None,
                external_id: Some("30111222".into()),
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (store, user) = seeded().await;
        let err = store
            .create_user(&CreateUser {
                name: "Other".into(),
                email: user.email.clone(),
                password_hash: "hash".into(),
                role_id: None,
                locality_id: None,
                external_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[tokio::test]
    async fn activate_keeps_one_active_record() {
        let (store, user) = seeded().await;
        store.activate_session(user.id, "first").await.unwrap();
        store.activate_session(user.id, "second").await.unwrap();

        let records = store.sessions_for_user(user.id).await;
        let active: Vec<_> = records.iter().filter(|s| s.active).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].token, "second");
    }

    #[tokio::test]
    async fn renew_updates_the_active_record_in_place() {
        let (store, user) = seeded().await;
        let created = store.activate_session(user.id, "value").await.unwrap();
        store.set_session_attempts("value", 2).await;

        let renewed = store.renew_session(user.id, "ignored").await.unwrap();
        assert_eq!(renewed.id, created.id);
        assert_eq!(renewed.token, "value");
        assert_eq!(renewed.attempts, 0);
        assert_eq!(store.sessions_for_user(user.id).await.len(), 1);
    }

    #[tokio::test]
    async fn renew_inserts_when_nothing_is_active() {
        let (store, user) = seeded().await;
        let record = store.renew_session(user.id, "fresh").await.unwrap();
        assert!(record.is_usable());
        assert_eq!(record.token, "fresh");
    }

    #[tokio::test]
    async fn find_account_resolves_role_and_locality() {
        let store = MemoryStore::new();
        let role = store.insert_role("admin", &["users.read", "users.write"]).await;
        let locality = store.insert_locality("Rosario", "Santa Fe").await;
        let user = store
            .create_user(&CreateUser {
                name: "Root".into(),
                email: "root@x.com".into(),
                password_hash: "hash".into(),
                role_id: Some(role.id),
                locality_id: Some(locality.id),
                external_id: None,
            })
            .await
            .unwrap();

        let account = store.find_account(user.id).await.unwrap().unwrap();
        assert_eq!(account.role, Some(role));
        assert_eq!(account.locality, Some(locality));
        assert!(store.find_account(9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reset_token_is_redeemed_once() {
        let (store, user) = seeded().await;
        store
            .create_reset_token(&CreatePasswordResetToken {
                token: "tok".into(),
                user_id: user.id,
                expires_at: Utc::now() + Duration::minutes(10),
            })
            .await
            .unwrap();

        assert!(store.redeem_reset_token("tok", "new-hash").await.unwrap());
        assert!(!store.redeem_reset_token("tok", "other").await.unwrap());

        let updated = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn expired_reset_token_is_not_redeemed() {
        let (store, user) = seeded().await;
        store
            .create_reset_token(&CreatePasswordResetToken {
                token: "old".into(),
                user_id: user.id,
                expires_at: Utc::now() - Duration::minutes(1),
            })
            .await
            .unwrap();

        assert!(!store.redeem_reset_token("old", "new-hash").await.unwrap());
        let row = store.find_reset_token("old").await.unwrap().unwrap();
        assert!(!row.used);
    }
}
