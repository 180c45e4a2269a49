//! Catalog record handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use tracing::info;

use shared::{EnrichedSubject, StoredRecord};

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EnrichedRecord {
    pub record: StoredRecord,
    pub enrichment: EnrichedSubject,
}

async fn find(state: &AppState, id: u64) -> WebServerResult<StoredRecord> {
    state
        .records
        .get(id)
        .await?
        .ok_or(WebServerError::RecordNotFound { id })
}

pub async fn list_animals(State(state): State<AppState>) -> WebServerResult<Json<Vec<StoredRecord>>> {
    Ok(Json(state.records.list().await?))
}

pub async fn get_animal(State(state): State<AppState>, Path(id): Path<u64>) -> WebServerResult<Json<StoredRecord>> {
    Ok(Json(find(&state, id).await?))
}

pub async fn create_animal(
    State(state): State<AppState>,
    Json(mut record): Json<StoredRecord>,
) -> WebServerResult<(StatusCode, Json<StoredRecord>)> {
    record.id = 0;
    let created = state.records.upsert(record).await?;
    info!(id = created.id, name = %created.name, "Created record");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_animal(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(mut record): Json<StoredRecord>,
) -> WebServerResult<Json<StoredRecord>> {
    find(&state, id).await?;
    record.id = id;
    Ok(Json(state.records.upsert(record).await?))
}

pub async fn delete_animal(State(state): State<AppState>, Path(id): Path<u64>) -> WebServerResult<StatusCode> {
    if !state.records.delete(id).await? {
        return Err(WebServerError::RecordNotFound { id });
    }
    info!(id, "Deleted record");
    Ok(StatusCode::NO_CONTENT)
}

/// A record together with its enrichment - /animals/:id/enriched
pub async fn get_enriched_animal(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> WebServerResult<Json<EnrichedRecord>> {
    let record = find(&state, id).await?;
    let subject = record.subject()?;
    let enrichment = state.enricher.enrich_all(&subject).await?;
    Ok(Json(EnrichedRecord { record, enrichment }))
}
