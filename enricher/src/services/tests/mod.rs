//! Tests for enricher services
//!
//! Cache and store behavior runs against a manual clock; the HTTP adapters
//! run against local wiremock servers.

pub mod memory_cache;
pub mod providers;

// Re-export test utilities
pub use crate::traits::*;
