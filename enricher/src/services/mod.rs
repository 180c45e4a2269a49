//! Enricher services implementations

pub mod clock;
pub mod memory_cache;
pub mod performance_tracker;
pub mod record_store;
pub mod providers;

#[cfg(test)]
pub mod tests;

pub use clock::*;
pub use memory_cache::*;
pub use performance_tracker::*;
pub use record_store::*;
pub use providers::*;
