//! Doris Stream Load subsystem.
//!
//! # Data Flow
//! ```text
//! newline-delimited JSON bytes
//!     → client.rs (label, auth, headers, pooled PUT to the BE)
//!     → full response body
//!     → types.rs (HTTP status + `Status` field → LoadResult | LoadError)
//! ```
//!
//! # Constraints
//! - Talks to a BE node directly, never through the FE
//! - Every call carries a fresh random label; labels are never reused
//! - Credentials never appear in logs or `Debug` output
//! - No retries: failures are reported to the caller immediately

pub mod client;
pub mod types;

pub use client::{ClientBuildError, StreamLoadClient, StreamLoader};
pub use types::{
    interpret_response, LoadError, LoadErrorKind, LoadResult, TransportKind, LOAD_COLUMNS,
    STATUS_SUCCESS,
};
