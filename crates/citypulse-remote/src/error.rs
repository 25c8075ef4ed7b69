//! Error types for citypulse-remote

use thiserror::Error;

/// Remote client error type
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Client not configured (missing base URL, bad TLS setup, ...)
    #[error("client not configured: {0}")]
    NotConfigured(String),

    /// Network error (connection refused, DNS, reset)
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the HTTP client timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Remote returned a non-success status
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Whether the failure happened before the remote produced an answer
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
