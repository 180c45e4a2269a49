//! Enricher configuration
//!
//! Every tunable of the enrichment core lives here. Values are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! Environment variables take precedence over .env file values.
//!
//! ## Per-kind settings
//! - `ENRICH_<KIND>_MAX_AGE_SECS`: cache expiry window (`IMAGE`, `TAXONOMY`, `OBSERVATIONS`, `DESCRIPTION`)
//! - `ENRICH_<KIND>_TIMEOUT_SECS`: per-call provider timeout
//!
//! ## Other settings
//! - `ENRICH_REQUEST_BUDGET_MS`, `ENRICH_OBSERVATION_LIMIT`, `ENRICH_CACHE_CAPACITY`,
//!   `ENRICH_MALFORMED_RETRIES`, `ENRICH_PLACEHOLDER_IMAGE_URL`, `ENRICH_UNAVAILABLE_DESCRIPTION`
//! - `UNSPLASH_ACCESS_KEY`, `OPENAI_API_KEY`, `OPENAI_MODEL`
//! - `IMAGE_API_BASE`, `TAXONOMY_API_BASE`, `OBSERVATION_API_BASE`, `TEXT_API_BASE`

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use shared::EnrichmentKind;
use crate::error::{EnrichError, EnrichResult};
use crate::types::KindSettings;

pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400?text=No+Image";
pub const DEFAULT_UNAVAILABLE_DESCRIPTION: &str = "Description unavailable.";

/// Extra time granted on top of the slowest per-kind timeout
const REQUEST_BUDGET_GRACE: Duration = Duration::from_millis(500);

/// Where the HTTP adapters send their requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub image_base: String,
    pub taxonomy_base: String,
    pub observation_base: String,
    pub text_base: String,
    pub unsplash_access_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub text_model: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            image_base: "https://api.unsplash.com".to_string(),
            taxonomy_base: "https://api.gbif.org".to_string(),
            observation_base: "https://api.inaturalist.org".to_string(),
            text_base: "https://api.openai.com".to_string(),
            unsplash_access_key: None,
            openai_api_key: None,
            text_model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnricherConfig {
    pub kinds: BTreeMap<EnrichmentKind, KindSettings>,
    /// Overall bound on one `enrich()` call; derived from the timeouts when `None`
    pub request_budget: Option<Duration>,
    pub observation_limit: u32,
    pub cache_capacity: Option<usize>,
    pub malformed_retries: u32,
    pub placeholder_image_url: String,
    pub unavailable_description: String,
    pub endpoints: ProviderEndpoints,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            kinds: EnrichmentKind::ALL
                .iter()
                .map(|kind| (*kind, KindSettings::default_for(*kind)))
                .collect(),
            request_budget: None,
            observation_limit: 10,
            cache_capacity: None,
            malformed_retries: 1,
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            unavailable_description: DEFAULT_UNAVAILABLE_DESCRIPTION.to_string(),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

impl EnricherConfig {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> EnrichResult<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> EnrichResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        for kind in EnrichmentKind::ALL {
            let prefix = format!("ENRICH_{}", kind.as_str().to_uppercase());
            let settings = config.kinds.entry(kind).or_insert_with(|| KindSettings::default_for(kind));
            if let Some(secs) = parse_var::<u64, _>(&lookup, &format!("{prefix}_MAX_AGE_SECS"))? {
                settings.max_age = Duration::from_secs(secs);
            }
            if let Some(secs) = parse_var::<u64, _>(&lookup, &format!("{prefix}_TIMEOUT_SECS"))? {
                if secs == 0 {
                    return Err(EnrichError::config(format!("{prefix}_TIMEOUT_SECS must be positive")));
                }
                settings.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(ms) = parse_var::<u64, _>(&lookup, "ENRICH_REQUEST_BUDGET_MS")? {
            config.request_budget = Some(Duration::from_millis(ms));
        }
        if let Some(limit) = parse_var(&lookup, "ENRICH_OBSERVATION_LIMIT")? {
            config.observation_limit = limit;
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, "ENRICH_CACHE_CAPACITY")? {
            config.cache_capacity = (capacity > 0).then_some(capacity);
        }
        if let Some(retries) = parse_var(&lookup, "ENRICH_MALFORMED_RETRIES")? {
            config.malformed_retries = retries;
        }
        if let Some(url) = lookup("ENRICH_PLACEHOLDER_IMAGE_URL") {
            config.placeholder_image_url = url;
        }
        if let Some(text) = lookup("ENRICH_UNAVAILABLE_DESCRIPTION") {
            config.unavailable_description = text;
        }

        let endpoints = &mut config.endpoints;
        if let Some(base) = lookup("IMAGE_API_BASE") {
            endpoints.image_base = base;
        }
        if let Some(base) = lookup("TAXONOMY_API_BASE") {
            endpoints.taxonomy_base = base;
        }
        if let Some(base) = lookup("OBSERVATION_API_BASE") {
            endpoints.observation_base = base;
        }
        if let Some(base) = lookup("TEXT_API_BASE") {
            endpoints.text_base = base;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            endpoints.text_model = model;
        }
        endpoints.unsplash_access_key = lookup("UNSPLASH_ACCESS_KEY").filter(|k| !k.trim().is_empty());
        endpoints.openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());

        Ok(config)
    }

    pub fn settings_for(&self, kind: EnrichmentKind) -> KindSettings {
        self.kinds
            .get(&kind)
            .copied()
            .unwrap_or_else(|| KindSettings::default_for(kind))
    }

    /// Explicit budget, or the slowest per-kind timeout plus a small grace
    ///
    /// The default does not cover a malformed retry on the slowest kind: that
    /// retry can run past the budget, in which case the kind degrades.
    pub fn effective_request_budget(&self) -> Duration {
        self.request_budget.unwrap_or_else(|| {
            let slowest = EnrichmentKind::ALL
                .iter()
                .map(|kind| self.settings_for(*kind).timeout)
                .max()
                .unwrap_or_default();
            slowest + REQUEST_BUDGET_GRACE
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> EnrichResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| EnrichError::config(format!("{key} has invalid value '{raw}'"))),
    }
}
