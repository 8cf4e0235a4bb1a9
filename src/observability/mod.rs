//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms via `metrics`)
//!
//! Consumers:
//!     → stdout (text or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - JSON format for log collectors, text for development
//! - Request ID (`x-request-id`) is attached to every access log line
//! - Secrets are masked before they reach a log event

pub mod logging;
pub mod metrics;
