//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (assign / propagate x-request-id)
//!     → middleware/access_log.rs (one log line + metrics per request)
//!     → panic boundary (500, connection task survives)
//!     → CORS (preflight answered here)
//!     → timeout, body limit
//!     → GET /health | POST /video (pipeline)
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerError, HEALTH_PATH, SERVICE_NAME};
