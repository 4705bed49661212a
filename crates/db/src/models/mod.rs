pub mod locality;
pub mod password_reset_token;
pub mod personal_token;
pub mod role;
pub mod user;
