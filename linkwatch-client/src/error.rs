//! Error types for status fetching.

use thiserror::Error;

/// Errors that can occur when fetching link status from a monitor.
///
/// Cloneable so one coalesced fetch outcome can be delivered to every
/// caller attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP request failed (protocol failure or non-2xx status).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse the response body.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the response.
    #[error("request timed out")]
    Timeout,

    /// The fetch this caller was attached to was dropped before completing.
    #[error("fetch was canceled")]
    Canceled,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}
