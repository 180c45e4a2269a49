//! Shared error types for the enrichment system

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Subject name must not be empty")]
    EmptyName,

    #[error("Unknown enrichment kind: {input}")]
    UnknownKind { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

/// Failure reported by an upstream provider adapter
///
/// `NotFound` is a terminal answer ("the upstream has nothing"), while
/// `Malformed` may be a transient glitch and is eligible for a retry.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("no data for query")]
    NotFound,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),
}

impl FetchError {
    /// Stable lowercase tag, used as a statistics bucket and log field
    pub fn tag(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::RateLimited => "rate_limited",
            FetchError::NotFound => "not_found",
            FetchError::Malformed(_) => "malformed",
            FetchError::Unreachable(_) => "unreachable",
        }
    }
}
