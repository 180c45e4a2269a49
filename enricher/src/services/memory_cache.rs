//! In-memory cache store
//!
//! Backed by a sharded `DashMap`, so reads and writes to different keys do not
//! contend and never suspend. Each write replaces the whole entry under its
//! shard lock: readers see either the old entry or the new one, never a mix.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, warn};

use shared::EnrichmentPayload;
use crate::error::{EnrichError, EnrichResult};
use crate::services::clock::SystemClock;
use crate::traits::{CacheStore, Clock};
use crate::types::{CacheEntry, CacheKey};

/// Tolerated distance between an entry's timestamp and "now" before it is suspect
const MAX_CLOCK_SKEW: Duration = Duration::from_secs(60);

pub struct MemoryCacheStore {
    entries: DashMap<CacheKey, CacheEntry>,
    clock: Arc<dyn Clock>,
    capacity: Option<usize>,
}

impl MemoryCacheStore {
    /// Unbounded store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            capacity: None,
        }
    }

    /// Bound the number of entries; the oldest fetch is evicted first
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity.filter(|c| *c > 0);
        self
    }

    /// All keys currently stored, sorted
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    fn validate(&self, key: &CacheKey, entry: &CacheEntry) -> EnrichResult<()> {
        let corrupt = |reason: String| EnrichError::CacheCorrupt {
            key: key.to_string(),
            reason,
        };

        if entry.key != *key {
            return Err(corrupt(format!("entry is stored under {}", entry.key)));
        }
        if entry.payload.kind() != key.kind {
            return Err(corrupt(format!("holds a {} payload", entry.payload.kind())));
        }
        let skew = chrono::Duration::from_std(MAX_CLOCK_SKEW).unwrap_or_else(|_| chrono::Duration::zero());
        if entry.fetched_at > self.clock.now() + skew {
            return Err(corrupt(format!("fetched_at {} is in the future", entry.fetched_at)));
        }
        Ok(())
    }

    /// Remove the oldest entry other than `keep`; false when nothing could be evicted
    fn evict_oldest(&self, keep: &CacheKey) -> bool {
        let oldest = self
            .entries
            .iter()
            .filter(|e| e.key() != keep)
            .min_by_key(|e| e.value().fetched_at)
            .map(|e| e.key().clone());

        match oldest {
            Some(key) => {
                debug!(key = %key, "Evicting oldest cache entry");
                self.entries.remove(&key);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.get(key).map(|e| e.value().clone())?;

        match self.validate(key, &entry) {
            Ok(()) => Some(entry),
            Err(error) => {
                warn!(error = %error, "Discarding corrupt cache entry");
                // Only drop the exact entry that failed; a concurrent good write survives
                self.entries.remove_if(key, |_, current| *current == entry);
                None
            }
        }
    }

    fn write(&self, key: CacheKey, payload: EnrichmentPayload) -> EnrichResult<CacheEntry> {
        if payload.kind() != key.kind {
            return Err(EnrichError::CacheCorrupt {
                key: key.to_string(),
                reason: format!("refusing to store a {} payload", payload.kind()),
            });
        }

        let entry = CacheEntry {
            key: key.clone(),
            payload,
            fetched_at: self.clock.now(),
        };
        self.entries.insert(key.clone(), entry.clone());

        if let Some(capacity) = self.capacity {
            while self.entries.len() > capacity {
                if !self.evict_oldest(&key) {
                    break;
                }
            }
        }

        Ok(entry)
    }

    fn is_fresh(&self, entry: &CacheEntry, max_age: Duration) -> bool {
        entry.is_fresh_at(max_age, self.clock.now())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
