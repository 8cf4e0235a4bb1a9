//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight answered here, CORS headers on everything else)
//!     → body limit (see http::server)
//!     → Pass to routing
//! ```

pub mod cors;

pub use cors::{build_cors_layer, CorsConfigError};
