//! The storage seam used by the session core and the HTTP handlers.

use async_trait::async_trait;
use authgate_core::types::DbId;

use crate::error::StoreResult;
use crate::models::locality::Locality;
use crate::models::password_reset_token::{CreatePasswordResetToken, PasswordResetToken};
use crate::models::personal_token::PersonalToken;
use crate::models::role::Role;
use crate::models::user::{CreateUser, User, UserAccount};

/// Persistence operations for users, roles, session records and reset tokens.
///
/// Implementations must keep at most one active session record per user, and
/// `activate_session` / `renew_session` must be serialized per user.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Confirm the backing storage is reachable.
    async fn ping(&self) -> StoreResult<()>;

    // ---------------------------------------------------------------------
    // Users, roles, localities
    // ---------------------------------------------------------------------

    /// Insert a user. Fails with `Duplicate("email")` on an existing email.
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>>;

    /// Look up by normalized email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>>;

    async fn find_role(&self, id: DbId) -> StoreResult<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    async fn find_locality(&self, id: DbId) -> StoreResult<Option<Locality>>;

    /// Load a user together with its role (and permissions) and locality.
    async fn find_account(&self, id: DbId) -> StoreResult<Option<UserAccount>> {
        let Some(user) = self.find_user_by_id(id).await? else {
            return Ok(None);
        };
        let role = match user.role_id {
            Some(role_id) => self.find_role(role_id).await?,
            None => None,
        };
        let locality = match user.locality_id {
            Some(locality_id) => self.find_locality(locality_id).await?,
            None => None,
        };
        Ok(Some(UserAccount {
            user,
            role,
            locality,
        }))
    }

    // ---------------------------------------------------------------------
    // Session records
    // ---------------------------------------------------------------------

    /// Deactivate every active record of `user_id`, then insert a fresh
    /// active record carrying `token`. Both steps happen atomically.
    async fn activate_session(&self, user_id: DbId, token: &str) -> StoreResult<PersonalToken>;

    /// Stamp the active record of `user_id` (`last_session = now`,
    /// `attempts = 0`), or insert one carrying `token` if none is active.
    async fn renew_session(&self, user_id: DbId, token: &str) -> StoreResult<PersonalToken>;

    /// Most recent record carrying `token`, active or not.
    async fn find_session(&self, token: &str) -> StoreResult<Option<PersonalToken>>;

    /// Deactivate every active record of `user_id`. Returns the affected count.
    async fn deactivate_sessions(&self, user_id: DbId) -> StoreResult<u64>;

    // ---------------------------------------------------------------------
    // Password reset tokens
    // ---------------------------------------------------------------------

    async fn create_reset_token(
        &self,
        input: &CreatePasswordResetToken,
    ) -> StoreResult<PasswordResetToken>;

    async fn find_reset_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>>;

    /// Mark `token` used and store `password_hash` on its owner, atomically.
    ///
    /// Returns `false` (and changes nothing) if the token is unknown, already
    /// used, or expired.
    async fn redeem_reset_token(&self, token: &str, password_hash: &str) -> StoreResult<bool>;
}
