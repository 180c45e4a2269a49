//! Shared logging utilities for consistent tracing across crates

use chrono::{DateTime, Utc};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose log level follows the configured base level
const OWN_CRATES: &[&str] = &["enricher", "shared", "webserver"];

/// Build the default filter directive string for a base level
pub fn filter_directives(base_level: &str) -> String {
    let mut directives: Vec<String> = OWN_CRATES
        .iter()
        .map(|krate| format!("{krate}={base_level}"))
        .collect();
    directives.push(format!("tower_http={base_level}"));
    directives.push("reqwest=warn".to_string());
    directives.push("hyper=warn".to_string());
    directives.join(",")
}

/// Initialize the stdout tracing subscriber
///
/// `RUST_LOG` wins over `log_level` when it is set. Calling this twice is harmless;
/// the second installation attempt is ignored.
pub fn init_tracing(log_level: Option<&str>) {
    let base_level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(base_level)));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

pub fn log_startup(service: &str, details: &str) {
    info!(
        service = service,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

pub fn log_shutdown(service: &str, reason: &str) {
    info!(
        service = service,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

pub fn log_error(service: &str, context: &str, error: &dyn std::fmt::Display) {
    error!(
        service = service,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

pub fn log_success(service: &str, message: &str) {
    info!(
        service = service,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
