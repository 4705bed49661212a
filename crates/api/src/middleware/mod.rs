//! Request middleware and the authenticated-user extractor.
//!
//! - [`auth::require_session`] -- runs the auth gate in front of every route.
//! - [`auth::AuthUser`] -- the identity the gate attached to a request.
//! - [`json::ValidatedJson`] -- JSON body extractor that runs `Validate`.
//! - [`throttle::throttle`] -- fixed-window rate limiting per client address.

pub mod auth;
pub mod json;
pub mod throttle;
