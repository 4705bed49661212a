pub mod auth;
pub mod contact;
pub mod password_reset;
pub mod proxy;
pub mod roles;
pub mod users;
