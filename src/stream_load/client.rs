//! Stream Load client with connection pooling and timeout handling.
//!
//! # Responsibilities
//! - Own the pooled outbound connection set to the Doris BE
//! - Build one `PUT .../_stream_load` request per submission
//! - Read the full response and classify it
//! - Never retry: one submission is exactly one attempt
//! - Connect to the BE directly, ignoring proxy environment variables

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Bytes;
use base64::{prelude::BASE64_STANDARD, Engine};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, EXPECT};
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;
use uuid::Uuid;

use crate::config::{DorisConfig, LoadClientConfig};
use crate::observability::metrics;
use crate::stream_load::types::{
    excerpt, interpret_response, LoadError, LoadResult, TransportKind, LOAD_COLUMNS,
};

/// Anything that can perform one bulk load of newline-delimited JSON.
///
/// The request pipeline depends on this rather than on [`StreamLoadClient`]
/// so tests can substitute a fake.
#[async_trait]
pub trait StreamLoader: Send + Sync {
    /// Submit `records` (one JSON object per line) as a single load.
    async fn submit(&self, records: Bytes) -> Result<LoadResult, LoadError>;
}

/// Errors constructing a [`StreamLoadClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid stream load URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("credentials cannot be sent as an HTTP header")]
    Credentials,

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Pooled HTTP client bound to one Doris table.
#[derive(Clone)]
pub struct StreamLoadClient {
    client: reqwest::Client,
    stream_url: Url,
    auth_header: HeaderValue,
    in_flight: Arc<Semaphore>,
    debug: bool,
}

impl StreamLoadClient {
    /// Create a client for the table described by `doris`.
    ///
    /// The stream URL and authorization header are computed here, once.
    pub fn new(
        doris: &DorisConfig,
        pool: &LoadClientConfig,
        debug: bool,
    ) -> Result<Self, ClientBuildError> {
        let url = format!(
            "{}/api/{}/{}/_stream_load",
            doris.be_http.trim_end_matches('/'),
            doris.database,
            doris.table
        );
        let stream_url = Url::parse(&url).map_err(|source| ClientBuildError::Url { url, source })?;

        let credentials = BASE64_STANDARD.encode(format!("{}:{}", doris.user, doris.password.expose()));
        let mut auth_header = HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|_| ClientBuildError::Credentials)?;
        auth_header.set_sensitive(true);

        let max_redirects = pool.max_redirects;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(pool.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() > max_redirects {
                    attempt.error(format!("more than {} redirects", max_redirects))
                } else {
                    attempt.follow()
                }
            }))
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(pool.idle_timeout_secs))
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .no_proxy()
            .build()?;

        tracing::info!(
            stream_url = %stream_url,
            user = %doris.user,
            timeout_secs = pool.request_timeout_secs,
            max_in_flight = pool.max_in_flight,
            max_idle_per_host = pool.max_idle_per_host,
            "Stream load client initialized"
        );

        Ok(Self {
            client,
            stream_url,
            auth_header,
            in_flight: Arc::new(Semaphore::new(pool.max_in_flight)),
            debug,
        })
    }

    /// The fully-qualified `_stream_load` URL.
    pub fn stream_url(&self) -> &Url {
        &self.stream_url
    }

    async fn execute(&self, label: &str, records: Bytes) -> Result<LoadResult, LoadError> {
        let _permit = self.in_flight.acquire().await.map_err(|_| LoadError::Transport {
            kind: TransportKind::Other,
            detail: "connection pool closed".to_string(),
        })?;

        let response = self
            .client
            .put(self.stream_url.clone())
            .header(AUTHORIZATION, self.auth_header.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(EXPECT, "100-continue")
            .header(CONTENT_LENGTH, records.len())
            .header("label", label)
            .header("format", "json")
            .header("read_json_by_line", "true")
            .header("columns", LOAD_COLUMNS)
            .body(records)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        interpret_response(status, &body)
    }
}

#[async_trait]
impl StreamLoader for StreamLoadClient {
    async fn submit(&self, records: Bytes) -> Result<LoadResult, LoadError> {
        let label = Uuid::new_v4().to_string();
        let start = Instant::now();

        if self.debug {
            tracing::debug!(
                url = %self.stream_url,
                label = %label,
                data = %excerpt(&records),
                "Sending stream load request"
            );
        }

        let outcome = self.execute(&label, records).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok(result) => {
                metrics::record_load_success(result, elapsed);
                if self.debug {
                    tracing::debug!(
                        label = %result.label,
                        txn_id = result.txn_id,
                        loaded_rows = result.number_loaded_rows,
                        total_rows = result.number_total_rows,
                        load_time_ms = result.load_time_ms,
                        "Stream load succeeded"
                    );
                }
            }
            Err(err) => {
                metrics::record_load_failure(err.kind(), elapsed);
                match err {
                    LoadError::Transport { kind, detail } => {
                        tracing::error!(label = %label, kind = %kind, cause = %detail, "Doris connection failed");
                    }
                    LoadError::Gateway { status, body } => {
                        tracing::error!(label = %label, status_code = status, body = %body, "Doris returned error status");
                    }
                    LoadError::Protocol { reason, body } => {
                        tracing::error!(label = %label, reason = %reason, body = %body, "Failed to parse Doris response");
                    }
                    LoadError::Rejected { status, message, error_url } => {
                        tracing::error!(
                            label = %label,
                            status = %status,
                            message = %message,
                            error_url = error_url.as_deref().unwrap_or(""),
                            "Doris stream load failed"
                        );
                    }
                }
            }
        }

        outcome
    }
}

impl std::fmt::Debug for StreamLoadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamLoadClient")
            .field("stream_url", &self.stream_url.as_str())
            .field("available_permits", &self.in_flight.available_permits())
            .finish()
    }
}

fn transport_error(err: reqwest::Error) -> LoadError {
    let kind = if err.is_timeout() {
        TransportKind::Timeout
    } else if err.is_redirect() {
        TransportKind::RedirectLimit
    } else if err.is_connect() {
        TransportKind::Connect
    } else {
        TransportKind::Other
    };
    LoadError::Transport {
        kind,
        detail: error_chain(&err),
    }
}

/// `err` followed by each of its sources, joined with `: `.
fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
