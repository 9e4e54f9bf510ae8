//! Errors raised while performing an API call
//!
//! Every failure of the network call funnels into one [`ApiError`], which is
//! then handed to the descriptor's `on_failure` callback.

use serde::Serialize;
use thiserror::Error;

/// Failure of a network call described by an [`ApiCall`](crate::ApiCall).
///
/// The error is `Clone` and `Serialize` so it can be carried inside derived
/// actions and embedded in JSON payloads (see [`api_error`](crate::api_error)).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    /// Connection or I/O failure, or a failure raised by a custom transport
    #[error("request failed: {message}")]
    Transport { message: String },

    /// The transport's configured timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status
    #[error("server responded with status {status}")]
    Status { status: u16, body: String },

    /// The descriptor could not be turned into a request (bad URL, header, ...)
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The response body could not be read
    #[error("failed to read response body: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Transport failure with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Malformed-request failure with the given message.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::invalid_request(err.to_string())
        } else if err.is_decode() || err.is_body() {
            Self::Decode {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::transport(err.to_string())
        }
    }
}
