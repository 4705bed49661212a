//! Reverse-proxy forwarders for the downstream services.
//!
//! Each [`Forwarder`] owns its upstream base URL, the path prefix it strips,
//! a timeout and any headers it injects. Requests are buffered (bounded by
//! the configured body limit) and replayed with `reqwest`; the upstream
//! status, headers and body come back unchanged apart from hop-by-hop headers.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::{OriginalUri, Request};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;

use crate::config::{ServerConfig, StorageCredentials};
use crate::error::{AppError, AppResult};

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);
const REPORTS_TIMEOUT: Duration = Duration::from_secs(30);
const FILES_TIMEOUT: Duration = Duration::from_secs(10);

fn strip_connection_headers(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers.remove(axum::http::header::CONTENT_LENGTH);
}

#[derive(Debug, Clone)]
pub struct Forwarder {
    name: &'static str,
    upstream: String,
    strip_prefix: &'static str,
    timeout: Duration,
    inject: HeaderMap,
    body_limit: usize,
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(
        name: &'static str,
        upstream: &str,
        strip_prefix: &'static str,
        timeout: Duration,
        client: reqwest::Client,
        body_limit: usize,
    ) -> Self {
        Self {
            name,
            upstream: upstream.trim_end_matches('/').to_string(),
            strip_prefix,
            timeout,
            inject: HeaderMap::new(),
            body_limit,
            client,
        }
    }

    /// Add headers set on every forwarded request, replacing caller values.
    pub fn with_injected_headers(mut self, headers: HeaderMap) -> Self {
        self.inject = headers;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Upstream URL for an inbound path and optional query string.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let rest = path.strip_prefix(self.strip_prefix).unwrap_or(path);
        let mut url = self.upstream.clone();
        if !rest.is_empty() && !rest.starts_with('/') {
            url.push('/');
        }
        url.push_str(rest);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Replay `request` against the upstream and relay its response.
    pub async fn forward(&self, request: Request) -> AppResult<Response> {
        let (parts, body) = request.into_parts();
        // Nested routers see a trimmed URI; the original carries the full path.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let url = self.target_url(uri.path(), uri.query());

        let body = to_bytes(body, self.body_limit)
            .await
            .map_err(|e| AppError::BadRequest(format!("Request body rejected: {e}")))?;

        let mut headers = parts.headers;
        strip_connection_headers(&mut headers);
        headers.remove(axum::http::header::HOST);
        for (name, value) in &self.inject {
            headers.insert(name.clone(), value.clone());
        }

        tracing::debug!(upstream = self.name, method = %parts.method, %url, "Forwarding request");

        let mut upstream_response = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let limit = self.body_limit;
        if upstream_response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(self.oversized());
        }

        let status = upstream_response.status();
        let mut response_headers = upstream_response.headers().clone();
        strip_connection_headers(&mut response_headers);
        for name in self.inject.keys() {
            response_headers.remove(name);
        }

        // Chunked bodies carry no length; stop reading once past the limit.
        let mut bytes = Vec::new();
        while let Some(chunk) = upstream_response
            .chunk()
            .await
            .map_err(|e| self.classify(e))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(self.oversized());
            }
            bytes.extend_from_slice(&chunk);
        }

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }

    fn oversized(&self) -> AppError {
        AppError::BadGateway {
            upstream: self.name,
            message: format!("response body exceeds {} bytes", self.body_limit),
        }
    }

    fn classify(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::GatewayTimeout {
                upstream: self.name,
            }
        } else {
            AppError::BadGateway {
                upstream: self.name,
                message: err.to_string(),
            }
        }
    }
}

/// Headers the files service expects on every request.
pub fn storage_headers(storage: &StorageCredentials) -> AppResult<HeaderMap> {
    let pairs = [
        ("s3-endpoint", &storage.endpoint),
        ("s3-region", &storage.region),
        ("s3-access-key-id", &storage.access_key_id),
        ("s3-access-secret-key", &storage.secret_access_key),
        ("s3-url", &storage.url),
        ("s3-bucket", &storage.bucket),
        ("api-key", &storage.api_key),
    ];
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value).map_err(|_| {
            AppError::InternalError(format!("Storage setting for '{name}' is not a valid header"))
        })?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

/// The three forwarders, sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct Forwarders {
    pub gateway: Forwarder,
    pub reports: Forwarder,
    pub files: Forwarder,
}

impl Forwarders {
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| AppError::InternalError(format!("HTTP client setup failed: {e}")))?;
        let limit = config.body_limit_bytes;

        Ok(Self {
            gateway: Forwarder::new(
                "gateway",
                &config.upstreams.gateway_url,
                "/api/v1/gateway",
                GATEWAY_TIMEOUT,
                client.clone(),
                limit,
            ),
            reports: Forwarder::new(
                "reports",
                &config.upstreams.reports_url,
                "/api/v1",
                REPORTS_TIMEOUT,
                client.clone(),
                limit,
            ),
            files: Forwarder::new(
                "files",
                &config.upstreams.files_url,
                "/api/v1/files",
                FILES_TIMEOUT,
                client,
                limit,
            )
            .with_injected_headers(storage_headers(&config.storage)?),
        })
    }
}
