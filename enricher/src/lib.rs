//! Enrichment core for the animal catalog
//!
//! Takes a subject (common name plus optional scientific name), pulls derived
//! data from slow and unreliable upstream providers, caches it with per-kind
//! expiry, and merges everything into one fully shaped response. Provider
//! failures never escape: they degrade into stale cache data or placeholders.

pub mod error;
pub mod types;
pub mod traits;
pub mod config;
pub mod core;
pub mod services;

// Re-export main types
pub use error::{EnrichError, EnrichResult};
pub use types::*;
pub use traits::*;
pub use config::{EnricherConfig, ProviderEndpoints};
pub use crate::core::{DegradationPolicy, Enricher, EnricherBuilder, FailureAction};
pub use services::*;
