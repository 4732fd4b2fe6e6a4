//! Error taxonomy shared by the store, the token flow and the Keka client.
//!
//! Library code returns [`KekaError`] so callers can tell a missing subdomain
//! apart from an expired page load or a rejected request. Commands convert
//! these into `anyhow` errors at the top level.

use thiserror::Error;

/// Result alias used across the library modules.
pub type KekaResult<T> = std::result::Result<T, KekaError>;

#[derive(Debug, Error)]
pub enum KekaError {
    /// Required setting (usually the subdomain) has not been configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A managed browser tab could not be opened or controlled.
    #[error("tab error: {0}")]
    Tab(String),

    /// The token did not show up (or the page did not load) in time.
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("the Keka client was used before it was initialized")]
    NotInitialized,

    /// Remote API answered with a non-success status or an unusable body.
    #[error("api error: {0}")]
    Api(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Key-value store misuse (empty or unknown key, wrong value type).
    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KekaError {
    /// Builds an [`KekaError::Api`] from a response status and the action that failed.
    pub fn status(action: &str, status: reqwest::StatusCode) -> Self {
        KekaError::Api(format!("{} failed: {}", action, status.canonical_reason().unwrap_or(status.as_str())))
    }
}
