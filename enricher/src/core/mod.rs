//! Core enrichment logic: orchestration and degradation policy

pub mod degradation;
pub mod orchestrator;

pub use degradation::{DegradationPolicy, FailureAction};
pub use orchestrator::{Enricher, EnricherBuilder};
