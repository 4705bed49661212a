//! Domain primitives shared by every authgate crate.

pub mod email;
pub mod error;
pub mod types;
