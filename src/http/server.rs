//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum Router with the health and ingestion routes
//! - Wire up middleware (request ID, access log, panic boundary, CORS,
//!   timeout, body limit)
//! - Serve until shutdown, then drain in-flight requests within the grace
//!   period

use std::any::Any;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::middleware::access_log;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::pipeline::{self, PipelineState};
use crate::security::cors::{build_cors_layer, CorsConfigError};
use crate::stream_load::StreamLoader;

/// Route path for liveness/readiness probes.
pub const HEALTH_PATH: &str = "/health";

/// Service name reported by the health probe.
pub const SERVICE_NAME: &str = "doris-webhook";

/// Errors from building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS policy: {0}")]
    Cors(#[from] CorsConfigError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("in-flight requests still running after {0:?} grace period")]
    DrainTimeout(Duration),
}

/// HTTP server for the webhook.
pub struct HttpServer {
    router: Router,
    grace_period: Duration,
}

impl HttpServer {
    /// Create a new HTTP server forwarding events to `loader`.
    pub fn new(config: &ServiceConfig, loader: Arc<dyn StreamLoader>) -> Result<Self, ServerError> {
        let state = PipelineState::new(loader, config.observability.debug);
        let router = Self::build_router(config, state)?;
        Ok(Self {
            router,
            grace_period: Duration::from_secs(config.shutdown.grace_period_secs),
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers are listed innermost first; the request ID layers end up
    /// outermost so every log line and response carries the ID.
    fn build_router(config: &ServiceConfig, state: PipelineState) -> Result<Router, CorsConfigError> {
        let cors = build_cors_layer(&config.cors)?;

        Ok(Router::new()
            .route(HEALTH_PATH, get(health))
            .merge(pipeline::router(state))
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.listener.request_timeout_secs),
            ))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::from_fn(access_log))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer()))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    ///
    /// After the signal no new connections are accepted. Requests still
    /// running when the grace period ends are dropped and
    /// [`ServerError::DrainTimeout`] is returned.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            health_check = %format!("http://{}{}", addr, HEALTH_PATH),
            "HTTP server starting"
        );

        let grace_period = self.grace_period;
        let draining = Arc::new(Notify::new());
        let notify = draining.clone();

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                // A closed channel means the coordinator is gone: shut down too.
                let _ = shutdown.recv().await;
                tracing::info!("Shutting down, draining in-flight requests");
                notify.notify_one();
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                result?;
                tracing::info!("HTTP server stopped");
                return Ok(());
            }
            _ = draining.notified() => {}
        }

        match tokio::time::timeout(grace_period, &mut server).await {
            Ok(result) => {
                result?;
                tracing::info!("HTTP server stopped gracefully");
                Ok(())
            }
            Err(_) => {
                tracing::error!(
                    grace_period = ?grace_period,
                    "Graceful shutdown timed out, dropping remaining connections"
                );
                Err(ServerError::DrainTimeout(grace_period))
            }
        }
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": SERVICE_NAME })))
}

/// Convert a handler panic into a 500 without tearing down the connection task.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
        .into_response()
}
