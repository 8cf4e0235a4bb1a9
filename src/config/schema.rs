//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the webhook.
//! All types derive Serde traits for deserialization from config files; the
//! loader overlays environment variables on top.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration for the webhook service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Inbound listener settings.
    pub listener: ListenerConfig,

    /// Doris back-end connection and credentials.
    pub doris: DorisConfig,

    /// Outbound Stream Load client tuning.
    pub load_client: LoadClientConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Total time allowed for one inbound request, in seconds.
    ///
    /// Must exceed `load_client.request_timeout_secs` so a slow load is
    /// reported as a gateway failure rather than an inbound timeout.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 35,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Doris back-end (BE) connection parameters.
///
/// Resolved once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DorisConfig {
    /// BE HTTP base URL (e.g., "http://doris-be:8040").
    pub be_http: String,

    /// Target database.
    pub database: String,

    /// Target table.
    pub table: String,

    /// Load user.
    pub user: String,

    /// Load user's password.
    pub password: Password,
}

impl Default for DorisConfig {
    fn default() -> Self {
        Self {
            be_http: String::new(),
            database: "video".to_string(),
            table: "video_metrics".to_string(),
            user: "devops".to_string(),
            password: Password::default(),
        }
    }
}

/// A credential that never prints in clear text.
///
/// `Debug` and `Display` both render the masked form, so the value can be
/// logged or dumped with the rest of the config safely.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The clear-text value. Only the Stream Load client should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First and last two characters with the middle replaced by `****`.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{head}****{tail}")
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password({})", self.masked())
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Stream Load client tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadClientConfig {
    /// End-to-end timeout (connect, write, read) for one load call, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum number of redirects followed before failing.
    pub max_redirects: usize,

    /// Maximum concurrent load calls across the whole process.
    pub max_in_flight: usize,

    /// Maximum idle pooled connections kept per host.
    pub max_idle_per_host: usize,

    /// How long an idle pooled connection is kept, in seconds.
    pub idle_timeout_secs: u64,
}

impl Default for LoadClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_redirects: 10,
            max_in_flight: 100,
            max_idle_per_host: 50,
            idle_timeout_secs: 90,
        }
    }
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any.
    pub allowed_origins: Vec<String>,

    /// Allowed methods; `*` allows any.
    pub allowed_methods: Vec<String>,

    /// Allowed request headers; `*` allows any.
    pub allowed_headers: Vec<String>,

    /// Whether credentialed requests are allowed.
    pub allow_credentials: bool,

    /// Preflight cache duration in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            allow_credentials: false,
            max_age_secs: 3600,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Verbose request/response logging for the load path.
    pub debug: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            debug: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight requests may run after a termination signal.
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_period_secs: 5 }
    }
}
