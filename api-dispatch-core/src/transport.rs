//! Transport layer: how an [`ApiRequest`] becomes a response
//!
//! The executor only knows the [`Transport`] trait. [`HttpTransport`] is the
//! `reqwest`-backed implementation; tests use
//! [`StubTransport`](crate::testing::StubTransport).
//!
//! Timeouts, base URLs and client-wide headers are transport configuration
//! ([`HttpConfig`]); the middleware itself imposes none of them.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde_json::Value;

use crate::api::{merge_headers, ApiRequest, ApiResponse};
use crate::error::ApiError;

/// Performs a request and resolves to its response body or a failure.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one request.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// Prefix joined onto relative descriptor URLs (`"/users"`)
    pub base_url: Option<String>,
    /// Whole-request timeout
    pub timeout: Option<Duration>,
    /// Headers sent with every request; descriptor headers win over these
    pub default_headers: BTreeMap<String, String>,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(Duration::from_secs(30)),
            default_headers: BTreeMap::new(),
            user_agent: concat!("api-dispatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative URLs against `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the request timeout.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Set the `User-Agent`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Turn a descriptor URL into an absolute one.
    ///
    /// Absolute URLs pass through untouched; anything else is joined onto
    /// `base_url`. Without a base, a relative URL is an invalid request.
    pub fn resolve_url(&self, url: &str) -> Result<Url, ApiError> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }

        let base = self.base_url.as_deref().ok_or_else(|| {
            ApiError::invalid_request(format!("relative url {url:?} without a base url"))
        })?;

        let joined = if url.is_empty() {
            base.to_string()
        } else {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        };

        Url::parse(&joined)
            .map_err(|e| ApiError::invalid_request(format!("invalid url {joined:?}: {e}")))
    }
}

/// [`Transport`] over HTTP, backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpTransport {
    /// Build a client from `config`.
    pub fn new(config: HttpConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Use an existing client. `config.timeout` and `config.user_agent` are
    /// ignored; the client's own settings apply.
    pub fn with_client(client: reqwest::Client, config: HttpConfig) -> Self {
        Self { client, config }
    }

    /// Active configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn header_map(&self, request: &ApiRequest) -> Result<HeaderMap, ApiError> {
        let mut merged = self.config.default_headers.clone();
        merge_headers(&mut merged, &request.headers);

        let mut headers = HeaderMap::with_capacity(merged.len());
        for (name, value) in &merged {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ApiError::invalid_request(format!("invalid header name {name:?}: {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                ApiError::invalid_request(format!("invalid value for header {name:?}: {e}"))
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.config.resolve_url(&request.url)?;
        let headers = self.header_map(&request)?;
        let json_body = sends_json(&headers);

        let mut builder = self
            .client
            .request(request.method_or_default(), url)
            .headers(headers);
        if let Some(data) = request.data {
            builder = if json_body {
                builder.json(&data)
            } else {
                builder.body(encode_text_body(data))
            };
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            data: decode_body(&bytes),
        })
    }
}

/// True when the outgoing `Content-Type` is JSON, or absent.
fn sends_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(reqwest::header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let media_type = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type.ends_with("/json") || media_type.ends_with("+json")
}

/// Body for a non-JSON content type: strings verbatim, anything else as JSON text.
fn encode_text_body(data: Value) -> String {
    match data {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Empty bodies become `Null`, non-JSON bodies a `String`.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
