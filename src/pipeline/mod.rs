//! Request pipeline: one inbound event to one Stream Load call.
//!
//! # Data Flow
//! ```text
//! POST /video
//!     → handler.rs (method, content type, JSON, required fields)
//!     → event.rs (EventRequest → LoadRecord, stamp event_time)
//!     → one newline-terminated JSON line
//!     → StreamLoader::submit
//!     → error.rs (LoadError → 502, input errors → 4xx)
//! ```

pub mod error;
pub mod event;
pub mod handler;

pub use error::PipelineError;
pub use event::{EventRequest, LoadRecord, EVENT_TIME_FORMAT};
pub use handler::{router, PipelineState, INGEST_PATH};
