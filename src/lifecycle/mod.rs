//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging → Validate → Build load client → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error exits with status 1
//! - Shutdown has a deadline: requests past the grace period are dropped
//!   and the process exits with status 1

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
