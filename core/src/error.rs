//! Error types for the Easypanel client.
//!
//! # Design
//! Every non-2xx response, whatever the operation, becomes the same
//! `ApiError::Status` carrying the request URI, the status code and the raw
//! body. There are no per-operation error types. Transport failures (nothing
//! came back), decode failures (something came back but it is not JSON) and
//! encode failures stay distinct so callers can tell them apart.

use thiserror::Error;

/// Name stamped on every status error.
pub const SERVICE_NAME: &str = "Easypanel";

/// Errors returned by the client, its parsers and its transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("[{service}] transport error: {0}", service = SERVICE_NAME)]
    Transport(String),

    /// The server answered with a status outside 200..=299.
    #[error("[{service}] {uri} failed with status {status} | {body}")]
    Status {
        service: &'static str,
        uri: String,
        status: u16,
        body: String,
    },

    /// The response body is not syntactically valid JSON.
    #[error("[{service}] response body could not be decoded: {0}", service = SERVICE_NAME)]
    Decode(String),

    /// The request payload could not be serialized.
    #[error("[{service}] request payload could not be encoded: {0}", service = SERVICE_NAME)]
    Encode(String),

    /// The client configuration is unusable.
    #[error("[{service}] invalid configuration: {0}", service = SERVICE_NAME)]
    Config(String),
}

impl ApiError {
    /// Normalize a response status into an error.
    ///
    /// Returns `None` for 2xx statuses. Any other status yields exactly one
    /// `ApiError::Status` holding `uri`, `status` and `body` verbatim.
    pub fn from_status(status: u16, uri: &str, body: &str) -> Option<Self> {
        if (200..300).contains(&status) {
            return None;
        }
        Some(ApiError::Status {
            service: SERVICE_NAME,
            uri: uri.to_string(),
            status,
            body: body.to_string(),
        })
    }

    /// The HTTP status, for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Encode(err.to_string())
    }
}
