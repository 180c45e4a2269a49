//! Test helpers and builder patterns for enricher tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use enricher::*;
use shared::{EnrichmentKind, EnrichmentPayload, FetchError};

use super::fixtures::TestFixtures;

/// Provider that plays back scripted responses, then repeats a default
pub struct ScriptedProvider {
    kind: EnrichmentKind,
    script: Mutex<VecDeque<Result<EnrichmentPayload, FetchError>>>,
    otherwise: Mutex<Result<EnrichmentPayload, FetchError>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    /// Always answers with the fixture payload for `kind`
    pub fn healthy(kind: EnrichmentKind) -> Self {
        Self::always(kind, Ok(TestFixtures::payload(kind)))
    }

    pub fn failing(kind: EnrichmentKind, error: FetchError) -> Self {
        Self::always(kind, Err(error))
    }

    pub fn always(kind: EnrichmentKind, response: Result<EnrichmentPayload, FetchError>) -> Self {
        Self {
            kind,
            script: Mutex::new(VecDeque::new()),
            otherwise: Mutex::new(response),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue one response ahead of the default
    pub fn then(self, response: Result<EnrichmentPayload, FetchError>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change the default response for later calls
    pub fn set_default(&self, response: Result<EnrichmentPayload, FetchError>) {
        *self.otherwise.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamProvider for ScriptedProvider {
    fn kind(&self) -> EnrichmentKind {
        self.kind
    }

    async fn fetch(&self, _query: &ProviderQuery) -> Result<EnrichmentPayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.script.lock().unwrap().pop_front();
        let response = response.unwrap_or_else(|| self.otherwise.lock().unwrap().clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        response
    }
}

/// Everything a test needs to drive and inspect one enricher
pub struct TestHarness {
    pub enricher: Enricher,
    pub cache: Arc<MemoryCacheStore>,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    pub fn cached(&self, kind: EnrichmentKind, subject: &shared::Subject) -> Option<CacheEntry> {
        self.cache.read(&CacheKey::for_subject(kind, subject))
    }
}

/// Builder for a test enricher on a manual clock with short timeouts
pub struct HarnessBuilder {
    providers: Vec<Arc<dyn UpstreamProvider>>,
    config: EnricherConfig,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        let mut config = EnricherConfig::default();
        for settings in config.kinds.values_mut() {
            settings.timeout = Duration::from_secs(1);
        }
        Self {
            providers: Vec::new(),
            config,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn UpstreamProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn timeout(mut self, kind: EnrichmentKind, timeout: Duration) -> Self {
        if let Some(settings) = self.config.kinds.get_mut(&kind) {
            settings.timeout = timeout;
        }
        self
    }

    pub fn request_budget(mut self, budget: Duration) -> Self {
        self.config.request_budget = Some(budget);
        self
    }

    pub fn build(self) -> TestHarness {
        let clock = Arc::new(ManualClock::new(TestFixtures::start_time()));
        let cache = Arc::new(MemoryCacheStore::with_clock(clock.clone()));
        let enricher = Enricher::builder(cache.clone())
            .providers(self.providers)
            .config(self.config)
            .build();

        TestHarness { enricher, cache, clock }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}
