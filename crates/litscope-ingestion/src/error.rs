//! Scopus client error types.

use litscope_common::LitscopeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopusError {
    /// The service has no document under this identifier (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The current API key hit its quota (HTTP 429).
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    /// Every attempt for `target` was rate limited.
    #[error("API keys exhausted for {target} after {attempts} attempts")]
    CredentialsExhausted { target: String, attempts: u32 },

    #[error("no Scopus API keys configured (set scopus.api_keys or LITSCOPE_SCOPUS_API_KEYS)")]
    NoApiKeys,

    #[error(transparent)]
    Sandbox(#[from] LitscopeError),
}
