//! Enrichment orchestrator
//!
//! For every requested kind, independently and concurrently:
//! cache lookup → provider call on stale/absent → write-through on success →
//! stale-serve or fallback on failure. Per-kind outcomes are merged into one
//! [`EnrichedSubject`] keyed by kind, so completion order never shows through.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use shared::{
    EnrichedSubject, Enrichment, EnrichmentKind, EnrichmentPayload, FetchError, Provenance, Subject,
};
use crate::config::EnricherConfig;
use crate::core::degradation::{DegradationPolicy, FailureAction};
use crate::error::{EnrichError, EnrichResult};
use crate::services::RealPerformanceTracker;
use crate::traits::{CacheStore, PerformanceTracker, UpstreamProvider};
use crate::types::{CacheKey, KindSettings, ProviderQuery, ProviderStats};

/// Assembles an [`Enricher`] from its collaborators
pub struct EnricherBuilder {
    cache: Arc<dyn CacheStore>,
    providers: HashMap<EnrichmentKind, Arc<dyn UpstreamProvider>>,
    tracker: Option<Arc<dyn PerformanceTracker>>,
    config: EnricherConfig,
}

impl EnricherBuilder {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            providers: HashMap::new(),
            tracker: None,
            config: EnricherConfig::default(),
        }
    }

    /// Register an adapter; a later adapter for the same kind replaces an earlier one
    pub fn provider(mut self, provider: Arc<dyn UpstreamProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn providers<I>(self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn UpstreamProvider>>,
    {
        providers.into_iter().fold(self, |builder, provider| builder.provider(provider))
    }

    pub fn tracker(mut self, tracker: Arc<dyn PerformanceTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn config(mut self, config: EnricherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Enricher {
        let policy = DegradationPolicy::from_config(&self.config);
        let kinds = EnrichmentKind::ALL
            .iter()
            .map(|kind| (*kind, self.config.settings_for(*kind)))
            .collect();

        Enricher {
            inner: Arc::new(EnricherInner {
                cache: self.cache,
                providers: self.providers,
                tracker: self
                    .tracker
                    .unwrap_or_else(|| Arc::new(RealPerformanceTracker::new())),
                policy,
                kinds,
                request_budget: self.config.effective_request_budget(),
                observation_limit: self.config.observation_limit,
            }),
        }
    }
}

struct EnricherInner {
    cache: Arc<dyn CacheStore>,
    providers: HashMap<EnrichmentKind, Arc<dyn UpstreamProvider>>,
    tracker: Arc<dyn PerformanceTracker>,
    policy: DegradationPolicy,
    kinds: BTreeMap<EnrichmentKind, KindSettings>,
    request_budget: Duration,
    observation_limit: u32,
}

/// The enrichment core; cheap to clone, all clones share one cache
#[derive(Clone)]
pub struct Enricher {
    inner: Arc<EnricherInner>,
}

impl Enricher {
    pub fn builder(cache: Arc<dyn CacheStore>) -> EnricherBuilder {
        EnricherBuilder::new(cache)
    }

    /// Enrich `subject` with every kind in `kinds`
    ///
    /// The only error is an invalid subject. Upstream failures of any kind are
    /// converted into stale or fallback entries and never abort sibling kinds.
    pub async fn enrich(&self, subject: &Subject, kinds: &[EnrichmentKind]) -> EnrichResult<EnrichedSubject> {
        subject.validate().map_err(EnrichError::InvalidSubject)?;

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "enrich",
            %request_id,
            subject = %subject.normalized_name()
        );
        let requested: BTreeSet<EnrichmentKind> = kinds.iter().copied().collect();

        async move {
            let deadline = tokio::time::Instant::now() + self.inner.request_budget;
            let mut pending = Vec::with_capacity(requested.len());

            for kind in requested {
                let worker = self.clone();
                let task_subject = subject.clone();
                // Spawned so an abandoned request still finishes warming the cache
                let handle = tokio::spawn(
                    async move { worker.enrich_kind(kind, &task_subject).await }.in_current_span(),
                );
                pending.push(self.settle(kind, subject, handle, deadline));
            }

            let mut enriched = EnrichedSubject::new(subject.clone());
            for (kind, enrichment) in join_all(pending).await {
                enriched.enrichments.insert(kind, enrichment);
            }

            debug!(
                kinds = enriched.enrichments.len(),
                fallbacks = enriched
                    .enrichments
                    .values()
                    .filter(|e| e.source == Provenance::Fallback)
                    .count(),
                "Enrichment complete"
            );
            Ok(enriched)
        }
        .instrument(span)
        .await
    }

    /// Enrich with all four kinds
    pub async fn enrich_all(&self, subject: &Subject) -> EnrichResult<EnrichedSubject> {
        self.enrich(subject, &EnrichmentKind::ALL).await
    }

    pub async fn stats(&self) -> EnrichResult<BTreeMap<EnrichmentKind, ProviderStats>> {
        self.inner.tracker.get_stats().await
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.inner.cache
    }

    pub fn has_provider(&self, kind: EnrichmentKind) -> bool {
        self.inner.providers.contains_key(&kind)
    }

    pub fn settings_for(&self, kind: EnrichmentKind) -> KindSettings {
        self.inner
            .kinds
            .get(&kind)
            .copied()
            .unwrap_or_else(|| KindSettings::default_for(kind))
    }

    pub fn request_budget(&self) -> Duration {
        self.inner.request_budget
    }

    /// Wait for one kind's task, bounded by the request deadline
    async fn settle(
        &self,
        kind: EnrichmentKind,
        subject: &Subject,
        handle: JoinHandle<Enrichment>,
        deadline: tokio::time::Instant,
    ) -> (EnrichmentKind, Enrichment) {
        let error = match tokio::time::timeout_at(deadline, handle).await {
            Ok(Ok(enrichment)) => return (kind, enrichment),
            Ok(Err(join_error)) => {
                warn!(kind = %kind, error = %join_error, "Enrichment task failed");
                FetchError::Unreachable(format!("enrichment task failed: {join_error}"))
            }
            Err(_) => {
                // Dropping the handle detaches the task; its result still lands in the cache
                warn!(kind = %kind, budget_ms = self.inner.request_budget.as_millis() as u64, "Request budget exceeded");
                FetchError::Timeout
            }
        };

        let stale = self.inner.cache.read(&CacheKey::for_subject(kind, subject));
        (kind, self.inner.policy.degrade(kind, stale, &error))
    }

    async fn enrich_kind(&self, kind: EnrichmentKind, subject: &Subject) -> Enrichment {
        let key = CacheKey::for_subject(kind, subject);
        let settings = self.settings_for(kind);
        let cached = self.inner.cache.read(&key);

        match &cached {
            Some(entry) if self.inner.cache.is_fresh(entry, settings.max_age) => {
                debug!(kind = %kind, key = %key, "Cache hit");
                return Enrichment {
                    source: Provenance::Cached,
                    fetched_at: Some(entry.fetched_at),
                    data: entry.payload.clone(),
                };
            }
            Some(_) => debug!(kind = %kind, key = %key, "Cache entry expired; refreshing"),
            None => debug!(kind = %kind, key = %key, "Cache miss"),
        }

        let Some(provider) = self.inner.providers.get(&kind).cloned() else {
            debug!(kind = %kind, "No provider configured");
            let error = FetchError::Unreachable(format!("no {kind} provider configured"));
            return self.inner.policy.degrade(kind, cached, &error);
        };

        let query = ProviderQuery::from_subject(subject, self.inner.observation_limit);
        match self.fetch_with_policy(kind, provider.as_ref(), &query, settings.timeout).await {
            Ok(payload) => match self.inner.cache.write(key, payload.clone()) {
                Ok(entry) => Enrichment {
                    source: Provenance::Fresh,
                    fetched_at: Some(entry.fetched_at),
                    data: entry.payload,
                },
                Err(error) => {
                    warn!(kind = %kind, error = %error, "Cache write rejected; returning uncached data");
                    Enrichment {
                        source: Provenance::Fresh,
                        fetched_at: None,
                        data: payload,
                    }
                }
            },
            Err(error) => self.inner.policy.degrade(kind, cached, &error),
        }
    }

    /// Call a provider under its timeout, retrying as the policy allows
    async fn fetch_with_policy(
        &self,
        kind: EnrichmentKind,
        provider: &dyn UpstreamProvider,
        query: &ProviderQuery,
        timeout: Duration,
    ) -> Result<EnrichmentPayload, FetchError> {
        let mut retries = 0;
        loop {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(timeout, provider.fetch(query)).await {
                Ok(Ok(payload)) if payload.kind() == kind => Ok(payload),
                Ok(Ok(payload)) => Err(FetchError::Malformed(format!(
                    "expected {kind} payload, got {}",
                    payload.kind()
                ))),
                Ok(Err(error)) => Err(error),
                Err(_) => Err(FetchError::Timeout),
            };

            match outcome {
                Ok(payload) => {
                    let elapsed = started.elapsed();
                    info!(kind = %kind, elapsed_ms = elapsed.as_millis() as u64, "Fetched fresh data");
                    if let Err(e) = self.inner.tracker.record_success(kind, elapsed).await {
                        debug!(kind = %kind, error = %e, "Could not record provider success");
                    }
                    return Ok(payload);
                }
                Err(error) => {
                    warn!(kind = %kind, error = %error, attempt = retries + 1, "Provider call failed");
                    if let Err(e) = self.inner.tracker.record_failure(kind, &error).await {
                        debug!(kind = %kind, error = %e, "Could not record provider failure");
                    }
                    match self.inner.policy.action_for(&error, retries) {
                        FailureAction::RetryImmediately => retries += 1,
                        FailureAction::GiveUp => return Err(error),
                    }
                }
            }
        }
    }
}
