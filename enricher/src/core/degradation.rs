//! Degradation policy: retry decisions and fallback payloads
//!
//! All retry and fallback behavior is defined here, once. The orchestrator
//! asks [`DegradationPolicy::action_for`] after every failed provider call and
//! [`DegradationPolicy::degrade`] once a kind has run out of options.

use tracing::warn;

use shared::{
    DescriptionResult, EnrichmentKind, EnrichmentPayload, Enrichment, FetchError, ImageResult,
    ObservationResult, Provenance, TaxonomyResult,
};
use crate::config::EnricherConfig;
use crate::types::CacheEntry;

/// What to do after a failed provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Call the provider again right away
    RetryImmediately,
    /// Stop calling; serve stale data or a fallback
    GiveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradationPolicy {
    placeholder_image_url: String,
    unavailable_description: String,
    malformed_retries: u32,
}

impl Default for DegradationPolicy {
    fn default() -> Self {
        Self::from_config(&EnricherConfig::default())
    }
}

impl DegradationPolicy {
    pub fn new(
        placeholder_image_url: impl Into<String>,
        unavailable_description: impl Into<String>,
        malformed_retries: u32,
    ) -> Self {
        Self {
            placeholder_image_url: placeholder_image_url.into(),
            unavailable_description: unavailable_description.into(),
            malformed_retries,
        }
    }

    pub fn from_config(config: &EnricherConfig) -> Self {
        Self::new(
            config.placeholder_image_url.clone(),
            config.unavailable_description.clone(),
            config.malformed_retries,
        )
    }

    /// Retries allowed within one orchestration call for this error
    ///
    /// Only a malformed response is worth repeating immediately. The rest are
    /// left for the next request, which retries naturally because failures are
    /// never cached.
    pub fn retry_budget(&self, error: &FetchError) -> u32 {
        match error {
            FetchError::Malformed(_) => self.malformed_retries,
            FetchError::Timeout
            | FetchError::RateLimited
            | FetchError::NotFound
            | FetchError::Unreachable(_) => 0,
        }
    }

    /// Decide the next step given how many retries were already spent
    pub fn action_for(&self, error: &FetchError, retries_so_far: u32) -> FailureAction {
        if retries_so_far < self.retry_budget(error) {
            FailureAction::RetryImmediately
        } else {
            FailureAction::GiveUp
        }
    }

    /// Placeholder payload for a kind that produced no usable data
    pub fn fallback(&self, kind: EnrichmentKind) -> EnrichmentPayload {
        match kind {
            EnrichmentKind::Image => EnrichmentPayload::Image(ImageResult {
                url: self.placeholder_image_url.clone(),
                placeholder: true,
            }),
            EnrichmentKind::Taxonomy => EnrichmentPayload::Taxonomy(TaxonomyResult::unknown()),
            EnrichmentKind::Observations => EnrichmentPayload::Observations(ObservationResult::default()),
            EnrichmentKind::Description => {
                EnrichmentPayload::Description(DescriptionResult::unavailable(self.unavailable_description.clone()))
            }
        }
    }

    /// Resolve a kind whose provider call failed
    ///
    /// Stale data beats a placeholder: an expired entry is served tagged
    /// `Cached`. Only when nothing was ever stored does the fallback apply.
    pub fn degrade(&self, kind: EnrichmentKind, stale: Option<CacheEntry>, error: &FetchError) -> Enrichment {
        match stale {
            Some(entry) => {
                warn!(
                    kind = %kind,
                    key = %entry.key,
                    error = %error,
                    fetched_at = %entry.fetched_at,
                    "Serving stale cache entry after provider failure"
                );
                Enrichment {
                    source: Provenance::Cached,
                    fetched_at: Some(entry.fetched_at),
                    data: entry.payload,
                }
            }
            None => {
                warn!(kind = %kind, error = %error, "Provider failed with no cached data; using fallback");
                Enrichment {
                    source: Provenance::Fallback,
                    fetched_at: None,
                    data: self.fallback(kind),
                }
            }
        }
    }
}
