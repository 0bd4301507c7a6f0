//! Error types for the currency converter.

use std::fmt;

/// Failure of a single rate source attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: status {0}")]
    Http(u16),

    #[error("Unrecognized response: {0}")]
    Parse(String),

    #[error("Request timed out")]
    Timeout,
}

/// A [`FetchError`] tagged with the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: FetchError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Every configured source failed. Carries the per-source failures in the
/// order they were attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("All rate providers failed ({})", summarize(.failures))]
pub struct AllProvidersFailed {
    pub failures: Vec<ProviderFailure>,
}

fn summarize(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "no providers configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Persistent key-value store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}
