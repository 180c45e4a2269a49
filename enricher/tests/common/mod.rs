//! Common test utilities and infrastructure
//!
//! Shared fixtures, scripted providers and a harness builder used across the
//! enricher test suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{HarnessBuilder, ScriptedProvider, TestHarness};
