//! Caller-visible failures of the ingestion route.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::stream_load::LoadError;

/// Everything that can stop an event from being loaded.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    #[error("Invalid request body: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("Invalid request body: '{0}' is required")]
    MissingField(&'static str),

    #[error("Failed to marshal data")]
    Encode(#[source] serde_json::Error),

    #[error("Doris stream load failed: {0}")]
    Load(#[source] LoadError),
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            PipelineError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PipelineError::MalformedJson(_) | PipelineError::MissingField(_) => StatusCode::BAD_REQUEST,
            PipelineError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Load(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message returned to the caller.
    ///
    /// Load failures are reduced to their public form so response bodies and
    /// internal URLs from the BE never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            PipelineError::Load(err) => format!("Doris stream load failed: {}", err.public_message()),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
