//! REST API handlers
//!
//! Health, enrichment and provider statistics endpoints

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use enricher::ProviderStats;
use shared::{EnrichedSubject, EnrichmentKind, Subject};

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EnrichmentQuery {
    pub name: Option<String>,
    pub scientific_name: Option<String>,
    /// Comma-separated kinds; all kinds when absent or blank
    pub kinds: Option<String>,
}

impl EnrichmentQuery {
    pub fn subject(&self) -> WebServerResult<Subject> {
        let subject = Subject::new(self.name.clone().unwrap_or_default())?;
        Ok(match &self.scientific_name {
            Some(scientific) => subject.with_scientific_name(scientific.clone()),
            None => subject,
        })
    }

    pub fn kinds(&self) -> WebServerResult<Vec<EnrichmentKind>> {
        match self.kinds.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => EnrichmentKind::parse_list(raw).map_err(|e| {
                WebServerError::InvalidRequest { details: format!("kinds: {e}") }
            }),
            _ => Ok(EnrichmentKind::ALL.to_vec()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub cache_entries: usize,
    pub providers: BTreeMap<EnrichmentKind, ProviderStats>,
}

/// Health check endpoint
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Enrich an arbitrary subject - /api/enrichment
pub async fn get_enrichment(
    State(state): State<AppState>,
    Query(query): Query<EnrichmentQuery>,
) -> WebServerResult<Json<EnrichedSubject>> {
    let subject = query.subject()?;
    let kinds = query.kinds()?;
    debug!(subject = %subject.name, kinds = kinds.len(), "Enrichment requested");

    let enriched = state.enricher.enrich(&subject, &kinds).await?;
    Ok(Json(enriched))
}

/// Per-kind provider statistics - /api/stats
pub async fn get_stats(State(state): State<AppState>) -> WebServerResult<Json<StatsResponse>> {
    let providers = state.enricher.stats().await?;
    Ok(Json(StatsResponse {
        status: "ok",
        uptime_seconds: state.uptime_seconds(),
        cache_entries: state.enricher.cache().len(),
        providers,
    }))
}
