//! `POST /video`: validate, transform, load, map the outcome.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    routing::post,
    Json, Router,
};
use chrono::Local;
use serde_json::{json, Value};

use crate::pipeline::error::PipelineError;
use crate::pipeline::event::{EventRequest, LoadRecord};
use crate::stream_load::StreamLoader;

/// Route path for event ingestion.
pub const INGEST_PATH: &str = "/video";

/// State shared by every ingestion request.
#[derive(Clone)]
pub struct PipelineState {
    pub loader: Arc<dyn StreamLoader>,
    pub debug: bool,
}

impl PipelineState {
    pub fn new(loader: Arc<dyn StreamLoader>, debug: bool) -> Self {
        Self { loader, debug }
    }
}

/// Router holding the ingestion route.
pub fn router(state: PipelineState) -> Router {
    Router::new()
        .route(INGEST_PATH, post(ingest_event).fallback(method_not_allowed))
        .with_state(state)
}

/// Handle one event end to end.
///
/// Input problems are rejected before the loader is touched. Dropping this
/// future (client disconnect) drops the in-flight load call with it.
pub async fn ingest_event(
    State(state): State<PipelineState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, PipelineError> {
    if !is_json_content_type(&headers) {
        return Err(reject(PipelineError::UnsupportedMediaType));
    }

    let request: EventRequest =
        serde_json::from_slice(&body).map_err(|e| reject(PipelineError::MalformedJson(e)))?;
    if let Some(field) = request.missing_field() {
        return Err(reject(PipelineError::MissingField(field)));
    }

    if state.debug {
        tracing::debug!(project = %request.project, event = %request.event, "Processing event");
    }

    let record = LoadRecord::from_request(request, Local::now().naive_local());
    let line = record.to_json_line().map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize load record");
        PipelineError::Encode(e)
    })?;

    state.loader.submit(Bytes::from(line)).await.map_err(|e| {
        tracing::error!(error = %e, kind = e.kind().as_str(), "Write to Doris failed");
        PipelineError::Load(e)
    })?;

    Ok(Json(json!({ "message": "Data processed successfully." })))
}

async fn method_not_allowed() -> PipelineError {
    PipelineError::MethodNotAllowed
}

fn reject(err: PipelineError) -> PipelineError {
    tracing::warn!(error = %err, "Request validation failed");
    err
}

/// True when the media type is `application/json`, ignoring parameters.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
