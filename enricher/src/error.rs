//! Enricher error types

use thiserror::Error;
use shared::SharedError;

/// Result type for enricher operations
pub type EnrichResult<T> = Result<T, EnrichError>;

/// Enricher error types
///
/// Provider failures are not represented here: they are absorbed by the
/// orchestrator and never reach callers.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Invalid subject: {0}")]
    InvalidSubject(SharedError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Cache entry for {key} failed validation: {reason}")]
    CacheCorrupt { key: String, reason: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),
}

impl EnrichError {
    pub fn config(message: impl Into<String>) -> Self {
        EnrichError::Config { message: message.into() }
    }
}
