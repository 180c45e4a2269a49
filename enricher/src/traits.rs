//! Enricher trait definitions for dependency injection

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use shared::{EnrichmentKind, EnrichmentPayload, FetchError, StoredRecord};
use crate::error::EnrichResult;
use crate::types::{CacheEntry, CacheKey, ProviderQuery, ProviderStats};

/// One adapter per external capability
///
/// Implementations perform exactly one outbound call per `fetch` and keep no
/// state between calls; caching belongs to the [`CacheStore`].
#[mockall::automock]
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// The enrichment kind this adapter produces
    fn kind(&self) -> EnrichmentKind;

    /// Fetch derived data for a subject
    async fn fetch(&self, query: &ProviderQuery) -> Result<EnrichmentPayload, FetchError>;
}

/// Shared key/value store of timestamped payloads
///
/// Reads and writes are in-memory and never suspend.
#[mockall::automock]
pub trait CacheStore: Send + Sync {
    /// Entry for `key` regardless of age, `None` when absent
    fn read(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Store `payload` stamped with the current time, replacing any previous entry
    fn write(&self, key: CacheKey, payload: EnrichmentPayload) -> EnrichResult<CacheEntry>;

    /// Whether `entry` is younger than `max_age` right now
    fn is_fresh(&self, entry: &CacheEntry, max_age: Duration) -> bool;

    /// Number of live entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of the current time
#[mockall::automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Performance tracking trait
#[mockall::automock]
#[async_trait]
pub trait PerformanceTracker: Send + Sync {
    /// Record successful provider call
    async fn record_success(&self, kind: EnrichmentKind, response_time: Duration) -> EnrichResult<()>;

    /// Record failed provider call
    async fn record_failure(&self, kind: EnrichmentKind, failure: &FetchError) -> EnrichResult<()>;

    /// Get provider statistics
    async fn get_stats(&self) -> EnrichResult<BTreeMap<EnrichmentKind, ProviderStats>>;
}

/// Catalog record storage collaborator
#[mockall::automock]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self) -> EnrichResult<Vec<StoredRecord>>;

    async fn get(&self, id: u64) -> EnrichResult<Option<StoredRecord>>;

    /// Insert when `record.id` is unknown (or zero), replace otherwise
    async fn upsert(&self, record: StoredRecord) -> EnrichResult<StoredRecord>;

    /// Returns whether a record was removed
    async fn delete(&self, id: u64) -> EnrichResult<bool>;
}
