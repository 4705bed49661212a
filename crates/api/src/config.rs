//! Server configuration loaded from environment variables.

use std::fmt;
use std::time::Duration;

use authgate_mail::templates::Branding;
use authgate_mail::{EmailConfig, MailError};

use crate::auth::jwt::{parse_ttl, JwtConfig};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Base URLs of the three downstream services.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub gateway_url: String,
    pub reports_url: String,
    pub files_url: String,
}

/// Object storage credentials injected into requests to the files service.
#[derive(Clone)]
pub struct StorageCredentials {
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub url: String,
    pub bucket: String,
    pub api_key: String,
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("url", &self.url)
            .field("bucket", &self.bucket)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins; `["*"]` allows any origin without credentials.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Largest request or upstream response body buffered, in bytes.
    pub body_limit_bytes: usize,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub throttle_window: Duration,
    pub throttle_limit: u32,
    pub upstreams: UpstreamConfig,
    pub storage: StorageCredentials,
    /// Base of the password reset link; the token is appended as a path segment.
    pub recovery_password_url: String,
    pub password_reset_expiry: chrono::Duration,
    /// Role assigned to self-registered users.
    pub registration_role: String,
    pub branding: Branding,
    /// Recipient of contact form messages. Contact mail is dropped when unset.
    pub contact_inbox: Option<String>,
    /// `None` disables SMTP delivery.
    pub email: Option<EmailConfig>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("database_url", &"<redacted>")
            .field("jwt", &self.jwt)
            .field("throttle_window", &self.throttle_window)
            .field("throttle_limit", &self.throttle_limit)
            .field("upstreams", &self.upstreams)
            .field("storage", &self.storage)
            .field("registration_role", &self.registration_role)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Reads variables through a lookup function, treating empty values as unset.
struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed<T: std::str::FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T::Err: fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => parse(key, &raw),
            None => Ok(default),
        }
    }

    fn required_parsed<T: std::str::FromStr>(&self, key: &'static str) -> Result<T, ConfigError>
    where
        T::Err: fmt::Display,
    {
        parse(key, &self.required(key)?)
    }

    fn ttl(&self, key: &'static str) -> Result<Duration, ConfigError> {
        parse_ttl(&self.required(key)?).map_err(|reason| ConfigError::Invalid { key, reason })
    }

    fn url(&self, key: &'static str) -> Result<String, ConfigError> {
        let raw = self.required(key)?;
        reqwest::Url::parse(&raw).map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })?;
        Ok(raw.trim_end_matches('/').to_string())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// | Env Var                          | Default          |
    /// |----------------------------------|------------------|
    /// | `DATABASE_URL`                   | required         |
    /// | `JWT_SECRET`                     | required         |
    /// | `JWT_SECRET_EXPIRES_IN`          | required (`15m`) |
    /// | `JWT_SECRET_EXPIRES_REFRESH_IN`  | required (`7d`)  |
    /// | `URL_GATEWAY`, `URL_MS_REPORTS`, `URL_MS_S3` | required |
    /// | `S3_*`, `APIKEY_S3`              | required         |
    /// | `THROTTLE_TTL` (ms), `THROTTLE_LIMIT` | required    |
    /// | `RECOVERY_PASSWORD_PUBLIC_URL`   | required         |
    /// | `HOST`                           | `0.0.0.0`        |
    /// | `PORT`                           | `3000`           |
    /// | `CORS_ORIGINS`                   | `*`              |
    /// | `REQUEST_TIMEOUT_SECS`           | `60`             |
    /// | `BODY_LIMIT_BYTES`               | 50 MiB           |
    /// | `PASSWORD_RESET_EXPIRY_MINS`     | `60`             |
    /// | `REGISTRATION_ROLE`              | `user`           |
    /// | `APP_NAME`                       | `Authgate`       |
    /// | `APP_LOGO`, `APP_COLOR`, `CONTACT_INBOX` | unset    |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let cors_origins: Vec<String> = vars
            .optional("CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let jwt = JwtConfig {
            secret: vars.required("JWT_SECRET")?,
            access_ttl: vars.ttl("JWT_SECRET_EXPIRES_IN")?,
            refresh_ttl: vars.ttl("JWT_SECRET_EXPIRES_REFRESH_IN")?,
        };

        let throttle_ttl_ms: u64 = vars.required_parsed("THROTTLE_TTL")?;
        if throttle_ttl_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "THROTTLE_TTL",
                reason: "must be positive".into(),
            });
        }

        let password_reset_expiry_mins: i64 = vars.parsed("PASSWORD_RESET_EXPIRY_MINS", 60)?;
        if password_reset_expiry_mins <= 0 {
            return Err(ConfigError::Invalid {
                key: "PASSWORD_RESET_EXPIRY_MINS",
                reason: "must be positive".into(),
            });
        }

        Ok(Self {
            host: vars.optional("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: vars.parsed("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: vars.parsed("REQUEST_TIMEOUT_SECS", 60)?,
            body_limit_bytes: vars.parsed("BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT_BYTES)?,
            database_url: vars.required("DATABASE_URL")?,
            jwt,
            throttle_window: Duration::from_millis(throttle_ttl_ms),
            throttle_limit: vars.required_parsed("THROTTLE_LIMIT")?,
            upstreams: UpstreamConfig {
                gateway_url: vars.url("URL_GATEWAY")?,
                reports_url: vars.url("URL_MS_REPORTS")?,
                files_url: vars.url("URL_MS_S3")?,
            },
            storage: StorageCredentials {
                endpoint: vars.required("S3_ENDPOINT")?,
                region: vars.required("S3_REGION")?,
                access_key_id: vars.required("S3_ACCESS_KEY_ID")?,
                secret_access_key: vars.required("S3_SECRET_ACCESS_KEY")?,
                url: vars.required("S3_URL")?,
                bucket: vars.required("S3_ACCESS_BUCKET")?,
                api_key: vars.required("APIKEY_S3")?,
            },
            recovery_password_url: vars
                .required("RECOVERY_PASSWORD_PUBLIC_URL")?
                .trim_end_matches('/')
                .to_string(),
            password_reset_expiry: chrono::Duration::minutes(password_reset_expiry_mins),
            registration_role: vars
                .optional("REGISTRATION_ROLE")
                .unwrap_or_else(|| "user".into()),
            branding: Branding {
                app_name: vars.optional("APP_NAME").unwrap_or_else(|| "Authgate".into()),
                logo_url: vars.optional("APP_LOGO"),
                color: vars.optional("APP_COLOR").unwrap_or_default(),
            },
            contact_inbox: vars.optional("CONTACT_INBOX"),
            email: EmailConfig::from_lookup(|key| vars.optional(key)).map_err(|e| match e {
                MailError::Config { key, reason } => ConfigError::Invalid { key, reason },
                other => ConfigError::Invalid {
                    key: "SMTP_HOST",
                    reason: other.to_string(),
                },
            })?,
        })
    }
}
