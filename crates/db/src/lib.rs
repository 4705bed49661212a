//! Persistence for users, roles, session records, and password reset tokens.
//!
//! The rest of the workspace talks to storage through the [`CredentialStore`]
//! trait. [`PgStore`] is the production implementation on top of the
//! repositories in [`repositories`]; `MemoryStore` (feature `test-support`)
//! keeps everything in process.

use sqlx::postgres::PgPoolOptions;

pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::CredentialStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
