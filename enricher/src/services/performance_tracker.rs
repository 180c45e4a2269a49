//! Performance tracking implementation

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use shared::{EnrichmentKind, FetchError};
use crate::error::EnrichResult;
use crate::traits::PerformanceTracker;
use crate::types::ProviderStats;

/// Real performance tracker with in-memory statistics
#[derive(Clone, Default)]
pub struct RealPerformanceTracker {
    stats: Arc<RwLock<BTreeMap<EnrichmentKind, ProviderStats>>>,
}

impl RealPerformanceTracker {
    /// Create new performance tracker
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PerformanceTracker for RealPerformanceTracker {
    async fn record_success(&self, kind: EnrichmentKind, response_time: Duration) -> EnrichResult<()> {
        let mut stats = self.stats.write().await;
        let provider_stats = stats.entry(kind).or_default();

        provider_stats.total_requests += 1;
        provider_stats.successful_requests += 1;
        provider_stats.total_response_time_ms += response_time.as_millis() as u64;
        provider_stats.last_used = Some(Utc::now());

        debug!(kind = %kind, elapsed_ms = response_time.as_millis() as u64, "Recorded provider success");
        Ok(())
    }

    async fn record_failure(&self, kind: EnrichmentKind, failure: &FetchError) -> EnrichResult<()> {
        let mut stats = self.stats.write().await;
        let provider_stats = stats.entry(kind).or_default();

        provider_stats.total_requests += 1;
        provider_stats.failed_requests += 1;
        *provider_stats.failures.entry(failure.tag().to_string()).or_insert(0) += 1;
        provider_stats.last_used = Some(Utc::now());

        debug!(kind = %kind, failure = %failure, "Recorded provider failure");
        Ok(())
    }

    async fn get_stats(&self) -> EnrichResult<BTreeMap<EnrichmentKind, ProviderStats>> {
        let stats = self.stats.read().await;
        Ok(stats.clone())
    }
}
