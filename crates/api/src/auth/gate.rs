//! Route classification and per-request admission.
//!
//! [`RouteTable`] decides whether a path is public. [`AuthGate`] turns the
//! `Authorization` header of a protected request into an [`AuthUser`] or
//! rejects it. Every failure is a plain 401; nothing is retried.

use std::sync::Arc;

use authgate_core::error::CoreError;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use super::jwt::TokenSigner;
use super::session::SessionRegistry;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
}

#[derive(Debug, Clone)]
enum PathMatch {
    Exact(String),
    /// Matches the path itself and anything below it (`/a` covers `/a/b`, not `/ab`).
    Prefix(String),
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatch::Exact(p) => path == p,
            PathMatch::Prefix(p) => path
                .strip_prefix(p.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// Path visibility rules, built once at startup.
///
/// Explicit rules are checked in insertion order. If none matches, the path
/// is public when it contains any allowlisted fragment, otherwise protected.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<(PathMatch, Visibility)>,
    public_fragments: Vec<String>,
}

/// Fragments that make any path containing them public.
pub const PUBLIC_FRAGMENTS: &[&str] = &[
    "/base/auth/password-reset",
    "/api/v1/public/users/register",
    "/api/v1/public/users/check",
    "/api/v1/contact/send",
];

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, path: &str, visibility: Visibility) -> Self {
        self.rules.push((PathMatch::Exact(path.to_string()), visibility));
        self
    }

    pub fn prefix(mut self, path: &str, visibility: Visibility) -> Self {
        self.rules
            .push((PathMatch::Prefix(path.trim_end_matches('/').to_string()), visibility));
        self
    }

    pub fn public_fragment(mut self, fragment: &str) -> Self {
        self.public_fragments.push(fragment.to_string());
        self
    }

    /// The table used by the server.
    pub fn standard() -> Self {
        let table = Self::new()
            .exact("/health", Visibility::Public)
            .exact("/api/v1/auth/sign-in", Visibility::Public)
            .exact("/api/v1/auth/refresh", Visibility::Public)
            .exact("/api/v1/auth/request-password-reset", Visibility::Public)
            .exact("/api/v1/auth/reset-password", Visibility::Public)
            .prefix("/api/v1/gateway", Visibility::Protected)
            .prefix("/api/v1/reports", Visibility::Protected)
            .prefix("/api/v1/files", Visibility::Protected);
        PUBLIC_FRAGMENTS
            .iter()
            .fold(table, |table, fragment| table.public_fragment(fragment))
    }

    pub fn classify(&self, path: &str) -> Visibility {
        if let Some((_, visibility)) = self.rules.iter().find(|(m, _)| m.matches(path)) {
            return *visibility;
        }
        if self.public_fragments.iter().any(|f| path.contains(f.as_str())) {
            Visibility::Public
        } else {
            Visibility::Protected
        }
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Outcome of a successful admission.
#[derive(Debug, Clone)]
pub enum Admission {
    /// Public route; no identity attached.
    Public,
    Authenticated(AuthUser),
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is case-sensitive and split on the first space.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    (scheme == "Bearer" && !token.is_empty()).then_some(token)
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// Single enforcement point for every inbound request.
#[derive(Clone)]
pub struct AuthGate {
    routes: Arc<RouteTable>,
    signer: Arc<TokenSigner>,
    sessions: SessionRegistry,
}

impl AuthGate {
    pub fn new(routes: RouteTable, signer: Arc<TokenSigner>, sessions: SessionRegistry) -> Self {
        Self {
            routes: Arc::new(routes),
            signer,
            sessions,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Admit or reject a request for `path` carrying `headers`.
    pub async fn admit(&self, path: &str, headers: &HeaderMap) -> AppResult<Admission> {
        if self.routes.classify(path) == Visibility::Public {
            return Ok(Admission::Public);
        }

        let token = bearer_token(headers).ok_or_else(|| unauthorized("Missing bearer token"))?;
        let claims = self
            .signer
            .verify(token)
            .map_err(|_| unauthorized("Invalid token."))?;

        let account = match self.sessions.resolve_session(&claims.payload).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(unauthorized("Session is no longer valid.")),
            Err(e) => {
                tracing::error!(error = %e, user_id = claims.payload.id, "Session lookup failed");
                return Err(unauthorized("Session is no longer valid."));
            }
        };

        Ok(Admission::Authenticated(AuthUser::from_account(
            account,
            claims.payload.value,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use authgate_db::models::user::CreateUser;
    use authgate_db::{CredentialStore, MemoryStore};
    use axum::http::HeaderValue;

    use crate::auth::jwt::{JwtConfig, Payload};

    #[test]
    fn allowlisted_fragment_is_public_anywhere() {
        let table = RouteTable::standard();
        assert_eq!(table.classify("/api/v1/contact/send"), Visibility::Public);
        assert_eq!(
            table.classify("/legacy/base/auth/password-reset/abc"),
            Visibility::Public
        );
        assert_eq!(
            table.classify("/api/v1/public/users/check"),
            Visibility::Public
        );
    }

    #[test]
    fn explicit_rules_win_over_fragments() {
        let table = RouteTable::standard();
        assert_eq!(
            table.classify("/api/v1/gateway/api/v1/contact/send"),
            Visibility::Protected
        );
        assert_eq!(
            table.classify("/api/v1/files/base/auth/password-reset"),
            Visibility::Protected
        );
    }

    #[test]
    fn unknown_paths_are_protected() {
        let table = RouteTable::standard();
        assert_eq!(table.classify("/api/v1/users/me"), Visibility::Protected);
        assert_eq!(table.classify("/"), Visibility::Protected);
        assert_eq!(table.classify("/api/v1/auth/sign-out"), Visibility::Protected);
    }

    #[test]
    fn prefix_respects_segment_boundaries() {
        let table = RouteTable::new().prefix("/api/v1/files/", Visibility::Public);
        assert_eq!(table.classify("/api/v1/files"), Visibility::Public);
        assert_eq!(table.classify("/api/v1/files/a/b"), Visibility::Public);
        assert_eq!(table.classify("/api/v1/filesystem"), Visibility::Protected);
    }

    #[test]
    fn exact_rules_do_not_cover_children() {
        let table = RouteTable::standard();
        assert_eq!(table.classify("/health"), Visibility::Public);
        assert_eq!(table.classify("/health/deep"), Visibility::Protected);
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("Bearer a b")), Some("a b"));
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearerabc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    async fn gate_with_session() -> (AuthGate, Arc<MemoryStore>, String) {
        let store = Arc::new(MemoryStore::new());
        let role = store.insert_role("user", &["files.read"]).await;
        let user = store
            .create_user(&CreateUser {
                name: "Ana".into(),
                email: "ana@x.com".into(),
                password_hash: "unused".into(),
                role_id: Some(role.id),
                locality_id: None,
                external_id: None,
            })
            .await
            .unwrap();

        let signer = Arc::new(TokenSigner::new(&JwtConfig {
            secret: "gate-secret".into(),
            access_ttl: Duration::from_secs(60),
            refresh_ttl: Duration::from_secs(600),
        }));
        let sessions = SessionRegistry::new(store.clone());
        let payload = Payload::new(&user, &role);
        sessions.create_active_session(&payload).await.unwrap();
        let token = signer.sign(&payload, None).unwrap();

        let gate = AuthGate::new(RouteTable::standard(), signer, sessions);
        (gate, store, token)
    }

    #[tokio::test]
    async fn public_path_skips_token_checks() {
        let (gate, _, _) = gate_with_session().await;
        let admission = gate.admit("/health", &HeaderMap::new()).await.unwrap();
        assert_matches!(admission, Admission::Public);
    }

    #[tokio::test]
    async fn valid_token_is_admitted() {
        let (gate, _, token) = gate_with_session().await;
        let admission = gate
            .admit("/api/v1/users/me", &headers(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_matches!(admission, Admission::Authenticated(user) if user.account.user.email == "ana@x.com");
    }

    #[tokio::test]
    async fn missing_or_bad_token_is_unauthorized() {
        let (gate, _, token) = gate_with_session().await;

        let err = gate
            .admit("/api/v1/users/me", &HeaderMap::new())
            .await
            .unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Unauthorized(_)));

        let err = gate
            .admit("/api/v1/users/me", &headers(&format!("Bearer {token}x")))
            .await
            .unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn revoked_session_is_unauthorized() {
        let (gate, store, token) = gate_with_session().await;
        let user_id = gate.signer.verify(&token).unwrap().payload.id;
        store.deactivate_sessions(user_id).await.unwrap();

        let err = gate
            .admit("/api/v1/users/me", &headers(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Unauthorized(_)));
    }
}
