use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use serde_json::{Value, json};
use tracing::info;
use trafficwatch_core::prelude::*;

use crate::{app::AppState, auth::authorize, error::ApiError};

/// What one successful ingestion wrote
#[derive(Debug)]
struct Ingested {
    batch: BatchId,
    records: usize,
    rejected: usize,
}

/// Receives one feed delivery and persists it as a batch
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    authorize(state.secret.as_deref(), &headers)?;

    let ingested = tokio::task::spawn_blocking(move || ingest(&state, &body)).await??;
    info!(
        batch = %ingested.batch,
        records = ingested.records,
        rejected = ingested.rejected,
        "Feed delivery stored"
    );

    Ok(Json(json!({ "status": "success" })))
}

fn ingest(state: &AppState, body: &[u8]) -> Result<Ingested, Error> {
    let payload: Value = serde_json::from_slice(body)?;

    let batch = state.store.next_batch_id();
    state.store.write_raw(&batch, body)?;

    let extraction = state.extractor.extract_json(payload)?;
    state.store.write_processed(&batch, &extraction.records)?;

    Ok(Ingested {
        batch,
        records: extraction.records.len(),
        rejected: extraction.rejected.len(),
    })
}

/// Records of every batch in the requested date range
pub async fn traffic(
    State(state): State<Arc<AppState>>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<IncidentRecord>>, ApiError> {
    let records = tokio::task::spawn_blocking(move || query(&state.store, &range)).await??;
    Ok(Json(records))
}

/// Hourly delay extremes and incident counts over the requested date range
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(range): Query<DateRange>,
) -> Result<Json<TrafficStats>, ApiError> {
    let stats = tokio::task::spawn_blocking(move || traffic_stats(&state.store, &range)).await??;
    Ok(Json(stats))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
