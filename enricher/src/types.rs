//! Enricher-specific data types

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{EnrichmentKind, EnrichmentPayload, Subject};

/// Deterministic cache key derived from `(kind, name, scientific name)`
///
/// Names are normalized (trimmed, whitespace collapsed, lowercased) so that
/// `"Lion"` and `"lion "` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub kind: EnrichmentKind,
    pub name: String,
    pub scientific_name: Option<String>,
}

impl CacheKey {
    pub fn for_subject(kind: EnrichmentKind, subject: &Subject) -> Self {
        Self {
            kind,
            name: subject.normalized_name(),
            scientific_name: subject.normalized_scientific_name(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scientific_name {
            Some(scientific) => write!(f, "{}:{}|{}", self.kind, self.name, scientific),
            None => write!(f, "{}:{}", self.kind, self.name),
        }
    }
}

/// A timestamped payload owned by the cache store
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: EnrichmentPayload,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// `now - fetched_at < max_age`
    pub fn is_fresh_at(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => now.signed_duration_since(self.fetched_at) < max_age,
            // A window too large to represent never expires
            Err(_) => true,
        }
    }
}

/// Parameters handed to an upstream provider adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    /// Common name, trimmed with whitespace collapsed; never empty
    pub name: String,
    pub scientific_name: Option<String>,
    /// Upper bound on list-shaped results (observations)
    pub limit: u32,
}

impl ProviderQuery {
    pub fn from_subject(subject: &Subject, limit: u32) -> Self {
        let tidy = |raw: &str| raw.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            name: tidy(&subject.name),
            scientific_name: subject
                .scientific_name
                .as_deref()
                .map(tidy)
                .filter(|s| !s.is_empty()),
            limit,
        }
    }

    /// Scientific name when known, otherwise the common name
    pub fn taxon(&self) -> &str {
        self.scientific_name.as_deref().unwrap_or(&self.name)
    }
}

/// Expiry window and call timeout for one enrichment kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSettings {
    pub max_age: Duration,
    pub timeout: Duration,
}

impl KindSettings {
    pub fn new(max_age: Duration, timeout: Duration) -> Self {
        Self { max_age, timeout }
    }

    pub fn default_for(kind: EnrichmentKind) -> Self {
        const HOUR: u64 = 60 * 60;
        match kind {
            EnrichmentKind::Image => Self::new(Duration::from_secs(24 * HOUR), Duration::from_secs(5)),
            EnrichmentKind::Taxonomy => Self::new(Duration::from_secs(24 * HOUR), Duration::from_secs(5)),
            EnrichmentKind::Observations => Self::new(Duration::from_secs(15 * 60), Duration::from_secs(8)),
            EnrichmentKind::Description => Self::new(Duration::from_secs(24 * HOUR), Duration::from_secs(20)),
        }
    }
}

/// Per-kind provider statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_response_time_ms: u64,
    /// Failure counts keyed by `FetchError::tag()`
    pub failures: BTreeMap<String, u64>,
    pub last_used: Option<DateTime<Utc>>,
}

impl ProviderStats {
    pub fn average_response_time_ms(&self) -> u64 {
        if self.successful_requests == 0 {
            0
        } else {
            self.total_response_time_ms / self.successful_requests
        }
    }
}
