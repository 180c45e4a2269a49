//! Webserver state shared by every handler

use std::sync::Arc;
use std::time::Instant;

use enricher::{Enricher, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub enricher: Enricher,
    pub records: Arc<dyn RecordStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(enricher: Enricher, records: Arc<dyn RecordStore>) -> Self {
        Self {
            enricher,
            records,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
