//! Repository layer: one zero-sized struct per table with associated query fns.

pub mod locality_repo;
pub mod password_reset_token_repo;
pub mod personal_token_repo;
pub mod role_repo;
pub mod user_repo;

pub use locality_repo::LocalityRepo;
pub use password_reset_token_repo::PasswordResetTokenRepo;
pub use personal_token_repo::PersonalTokenRepo;
pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
