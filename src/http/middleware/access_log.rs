//! Access logging middleware.
//!
//! One structured line per request. Level follows the response status:
//! `error` for 5xx, `warn` for 4xx, `info` otherwise.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::http::request::request_id;
use crate::observability::metrics;

pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let request_id = request_id(request.headers()).to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    let response = next.run(request).await;

    let status = response.status();
    let latency = start.elapsed();
    metrics::record_request(method.as_str(), status.as_u16(), start);

    if status.is_server_error() {
        tracing::error!(request_id = %request_id, status = status.as_u16(), method = %method, path = %path, query = %query, latency = ?latency, ip = %ip, "HTTP request");
    } else if status.is_client_error() {
        tracing::warn!(request_id = %request_id, status = status.as_u16(), method = %method, path = %path, query = %query, latency = ?latency, ip = %ip, "HTTP request");
    } else {
        tracing::info!(request_id = %request_id, status = status.as_u16(), method = %method, path = %path, query = %query, latency = ?latency, ip = %ip, "HTTP request");
    }

    response
}

/// Originating client address: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the TCP peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}
