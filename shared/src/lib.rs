//! Shared types for the animal catalog enrichment system
//!
//! Contains the domain vocabulary used by both the enrichment core and the
//! HTTP surface: subjects, enrichment kinds, payload variants, provenance tags
//! and the provider-level error taxonomy.

pub mod types;
pub mod payload;
pub mod errors;
pub mod logging;

pub use types::*;
pub use payload::*;
pub use errors::*;
