//! Session token signing, verification, and decoding.
//!
//! Tokens are HS256-signed JWTs whose claims are a [`Payload`] plus the
//! standard `iat` / `exp`. The payload's `value` is the join key with the
//! server-side session record, so a token is only as good as its record.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use authgate_core::types::DbId;
use authgate_db::models::role::Role;
use authgate_db::models::user::User;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Payload / claims
// ---------------------------------------------------------------------------

/// Identity carried inside every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// Role name.
    pub role: String,
    /// Random session value, shared with the session record.
    pub value: String,
    /// Unix time at which the payload was built.
    pub create_token: i64,
    pub permissions: Vec<String>,
}

impl Payload {
    /// Build a payload with a fresh random session value.
    pub fn new(user: &User, role: &Role) -> Self {
        Self::with_value(user, role, Uuid::new_v4().to_string())
    }

    /// Build a payload that reuses an existing session value.
    pub fn with_value(user: &User, role: &Role, value: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: role.name.clone(),
            value,
            create_token: chrono::Utc::now().timestamp(),
            permissions: role.permissions.clone(),
        }
    }
}

/// Full JWT claim set: the payload plus issue and expiry times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub payload: Payload,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Access + refresh token pair returned by sign-in and refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for session token signing.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Lifetime of access tokens.
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens.
    pub refresh_ttl: Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Longest accepted token lifetime (ten years).
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Parse a lifetime such as `"900"`, `"900s"`, `"15m"`, `"12h"` or `"7d"`.
///
/// A bare number is seconds. Zero and anything above [`MAX_TTL`] are rejected.
pub fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{raw}'"))?;
    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(format!("unknown duration unit '{other}' in '{raw}'")),
    };
    if amount == 0 {
        return Err(format!("duration '{raw}' must be positive"));
    }
    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .filter(|ttl| *ttl <= MAX_TTL)
        .ok_or_else(|| format!("duration '{raw}' is too large"))
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, expired, or malformed token.
    #[error("Invalid token")]
    InvalidSignature,

    #[error("Token encoding error: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("Token lifetime out of range")]
    LifetimeOutOfRange,
}

/// Signs and verifies session tokens. Holds nothing but keys and lifetimes.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Sign `payload` with the access lifetime, or `ttl` when given.
    pub fn sign(&self, payload: &Payload, ttl: Option<Duration>) -> Result<String, TokenError> {
        let ttl = ttl.unwrap_or(self.access_ttl);
        let now = chrono::Utc::now().timestamp();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or(TokenError::LifetimeOutOfRange)?;
        let claims = Claims {
            payload: payload.clone(),
            iat: now,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)
    }

    /// Sign the access and refresh tokens for the same payload.
    pub fn sign_pair(&self, payload: &Payload) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(payload, None)?,
            refresh_token: self.sign(payload, Some(self.refresh_ttl))?,
        })
    }

    /// Check signature and expiry (no leeway) and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidSignature)
    }

    /// Read the claims without checking signature or expiry.
    ///
    /// Only meaningful on a token that already passed [`TokenSigner::verify`].
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }

    fn payload() -> Payload {
        Payload {
            id: 42,
            name: "Ana".into(),
            email: "a@x.com".into(),
            role: "admin".into(),
            value: Uuid::new_v4().to_string(),
            create_token: chrono::Utc::now().timestamp(),
            permissions: vec!["users.read".into()],
        }
    }

    #[test]
    fn sign_then_verify_returns_payload() {
        let signer = TokenSigner::new(&config());
        let payload = payload();
        let token = signer.sign(&payload, None).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.payload, payload);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn claims_use_camel_case() {
        let signer = TokenSigner::new(&config());
        let token = signer.sign(&payload(), None).unwrap();
        let claims = serde_json::to_value(signer.decode(&token).unwrap()).unwrap();
        assert!(claims.get("createToken").is_some());
        assert!(claims.get("value").is_some());
        assert!(claims.get("exp").is_some());
        assert!(claims.get("payload").is_none());
    }

    #[test]
    fn pair_has_distinct_lifetimes() {
        let signer = TokenSigner::new(&config());
        let pair = signer.sign_pair(&payload()).unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);

        let access = signer.verify(&pair.access_token).unwrap();
        let refresh = signer.verify(&pair.refresh_token).unwrap();
        assert!(refresh.exp > access.exp);
        assert_eq!(access.payload.value, refresh.payload.value);
    }

    #[test]
    fn expired_token_fails_without_leeway() {
        let signer = TokenSigner::new(&config());
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            payload: payload(),
            iat: now - 10,
            exp: now - 1,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            signer.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
        // decode still reads it
        assert_eq!(signer.decode(&token).unwrap().payload.id, 42);
    }

    #[test]
    fn different_secret_fails() {
        let signer = TokenSigner::new(&config());
        let other = TokenSigner::new(&JwtConfig {
            secret: "another-secret".into(),
            ..config()
        });
        let token = other.sign(&payload(), None).unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn malformed_token_fails() {
        let signer = TokenSigner::new(&config());
        assert!(signer.verify("not-a-jwt").is_err());
        assert!(signer.decode("not-a-jwt").is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("long-enough"));
    }

    #[test]
    fn parses_ttl_units() {
        assert_eq!(parse_ttl("900").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_ttl("900s").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_ttl("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_ttl("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_ttl(" 7d ").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn rejects_bad_ttl() {
        assert!(parse_ttl("").is_err());
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("15w").is_err());
        assert!(parse_ttl("m").is_err());
        assert!(parse_ttl("1.5h").is_err());
    }

    #[test]
    fn rejects_ttl_beyond_maximum() {
        assert_eq!(parse_ttl("3650d").unwrap(), MAX_TTL);
        assert!(parse_ttl("3651d").is_err());
        assert!(parse_ttl("9223372036854775808").is_err());
        assert!(parse_ttl("18446744073709551615d").is_err());
    }

    #[test]
    fn huge_override_is_an_error_not_a_wrap() {
        let signer = TokenSigner::new(&config());
        let err = signer
            .sign(&payload(), Some(Duration::from_secs(u64::MAX)))
            .unwrap_err();
        assert!(matches!(err, TokenError::LifetimeOutOfRange));
    }
}
