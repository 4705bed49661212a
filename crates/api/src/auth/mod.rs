//! Authentication and session primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- Session token signing, verification, and decoding.
//! - [`session`] -- Server-side session records bound to token payloads.
//! - [`gate`] -- Route classification and per-request admission.

pub mod gate;
pub mod jwt;
pub mod password;
pub mod session;
