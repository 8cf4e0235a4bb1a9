//! Doris webhook library.
//!
//! HTTP ingestion bridge that turns JSON event posts into Apache Doris
//! Stream Load calls.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod security;
pub mod stream_load;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use stream_load::StreamLoadClient;
