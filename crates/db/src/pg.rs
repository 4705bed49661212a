//! PostgreSQL implementation of [`CredentialStore`].

use async_trait::async_trait;
use authgate_core::types::DbId;
use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};
use crate::models::locality::Locality;
use crate::models::password_reset_token::{CreatePasswordResetToken, PasswordResetToken};
use crate::models::personal_token::PersonalToken;
use crate::models::role::Role;
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    LocalityRepo, PasswordResetTokenRepo, PersonalTokenRepo, RoleRepo, UserRepo,
};
use crate::store::CredentialStore;

/// Store backed by a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        UserRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_unique(e, "uq_users_email", "email"))
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_external_id(&self.pool, external_id).await?)
    }

    async fn find_role(&self, id: DbId) -> StoreResult<Option<Role>> {
        Ok(RoleRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(RoleRepo::find_by_name(&self.pool, name).await?)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(RoleRepo::list(&self.pool).await?)
    }

    async fn find_locality(&self, id: DbId) -> StoreResult<Option<Locality>> {
        Ok(LocalityRepo::find_by_id(&self.pool, id).await?)
    }

    async fn activate_session(&self, user_id: DbId, token: &str) -> StoreResult<PersonalToken> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent sign-ins of the same user.
        UserRepo::lock_for_update(&mut *tx, user_id).await?;

        let deactivated = PersonalTokenRepo::deactivate_all_for_user(&mut *tx, user_id).await?;
        let record = PersonalTokenRepo::insert_active(&mut *tx, user_id, token)
            .await
            .map_err(|e| {
                StoreError::from_unique(e, "uq_personal_tokens_active_user", "active session")
            })?;

        tx.commit().await?;
        tracing::debug!(user_id, deactivated, session_id = record.id, "Session activated");
        Ok(record)
    }

    async fn renew_session(&self, user_id: DbId, token: &str) -> StoreResult<PersonalToken> {
        let mut tx = self.pool.begin().await?;
        UserRepo::lock_for_update(&mut *tx, user_id).await?;

        let record = match PersonalTokenRepo::touch_active(&mut *tx, user_id).await? {
            Some(record) => record,
            None => PersonalTokenRepo::insert_active(&mut *tx, user_id, token)
                .await
                .map_err(|e| {
                    StoreError::from_unique(e, "uq_personal_tokens_active_user", "active session")
                })?,
        };

        tx.commit().await?;
        Ok(record)
    }

    async fn find_session(&self, token: &str) -> StoreResult<Option<PersonalToken>> {
        Ok(PersonalTokenRepo::find_by_token(&self.pool, token).await?)
    }

    async fn deactivate_sessions(&self, user_id: DbId) -> StoreResult<u64> {
        Ok(PersonalTokenRepo::deactivate_all_for_user(&self.pool, user_id).await?)
    }

    async fn create_reset_token(
        &self,
        input: &CreatePasswordResetToken,
    ) -> StoreResult<PasswordResetToken> {
        PasswordResetTokenRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_unique(e, "password_reset_tokens_pkey", "token"))
    }

    async fn find_reset_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>> {
        Ok(PasswordResetTokenRepo::find_by_token(&self.pool, token).await?)
    }

    async fn redeem_reset_token(&self, token: &str, password_hash: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = PasswordResetTokenRepo::mark_used(&mut *tx, token).await? else {
            return Ok(false);
        };
        if !UserRepo::update_password(&mut *tx, row.user_id, password_hash).await? {
            // Owner vanished; dropping `tx` rolls back the mark-used.
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
