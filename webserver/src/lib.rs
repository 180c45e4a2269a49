//! HTTP surface for the animal catalog
//!
//! Exposes the enrichment core over a small JSON API together with the
//! catalog's record CRUD endpoints.

pub mod error;
pub mod state;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::AppState;
pub use webserver_impl::{build_router, WebServer};
