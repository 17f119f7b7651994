//! Error type shared by every call in the crate.

use thiserror::Error;

/// Error type for Pingup API operations.
///
/// - `Config` — the client could not be configured (missing token, bad header value)
/// - `Transport` — network/transport errors (wraps `reqwest::Error`)
/// - `Decode` — the response body was not the JSON we expected
/// - `Api` — the service answered with an `httpStatus` error body
#[derive(Debug, Error)]
pub enum PingupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Pingup API error {response_reference}: {message} {description}")]
    Api {
        http_status: Option<u16>,
        response_reference: String,
        message: String,
        description: String,
    },
}

impl PingupError {
    /// The `httpStatus` reported by the service, if this is an API error.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            PingupError::Api { http_status, .. } => *http_status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PingupError>;
