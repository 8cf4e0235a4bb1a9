//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): inbound requests by method, status
//! - `http_request_duration_seconds` (histogram): inbound latency
//! - `stream_load_requests_total` (counter): load calls by outcome
//! - `stream_load_duration_seconds` (histogram): load call latency
//! - `stream_load_rows_total` (counter): loaded/filtered rows from acknowledgments
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::stream_load::{LoadErrorKind, LoadResult};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one inbound request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("http_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a committed load.
pub fn record_load_success(result: &LoadResult, elapsed: Duration) {
    ::metrics::counter!("stream_load_requests_total", "outcome" => "success").increment(1);
    ::metrics::histogram!("stream_load_duration_seconds").record(elapsed.as_secs_f64());
    ::metrics::counter!("stream_load_rows_total", "kind" => "loaded")
        .increment(result.number_loaded_rows.max(0) as u64);
    ::metrics::counter!("stream_load_rows_total", "kind" => "filtered")
        .increment(result.number_filtered_rows.max(0) as u64);
}

/// Record a failed load.
pub fn record_load_failure(kind: LoadErrorKind, elapsed: Duration) {
    ::metrics::counter!("stream_load_requests_total", "outcome" => kind.as_str()).increment(1);
    ::metrics::histogram!("stream_load_duration_seconds").record(elapsed.as_secs_f64());
}
