//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (DORIS_*, LOG_*, CORS_*, ...)
//!     → endpoint normalization
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → passed explicitly to the load client, pipeline and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use validation::{validate_config, ValidationError};
pub use schema::{
    CorsConfig, DorisConfig, ListenerConfig, LoadClientConfig, LogFormat, ObservabilityConfig,
    Password, ServiceConfig, ShutdownConfig,
};
