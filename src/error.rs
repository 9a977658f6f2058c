//! Error types for the market HUD engine

use thiserror::Error;

/// Errors that can occur when fetching data from the market API
///
/// Every variant is treated as transient by the refresh layer except
/// [`FetchError::NotFound`], which callers normally map to an authoritative
/// "no listings" record before the error ever reaches a cache.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed (connection refused, DNS, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered 404 for the requested key
    #[error("not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status other than 404
    #[error("HTTP status {0}")]
    Status(u16),

    /// Response body did not match the expected JSON shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout waiting for a response
    #[error("request timeout")]
    Timeout,
}

impl FetchError {
    /// True when the failure should be retried on the next refresh cycle
    /// rather than written to a cache.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::NotFound(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::InvalidResponse(err.to_string())
    }
}
