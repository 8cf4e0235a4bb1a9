//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required connection parameters are present
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - CORS tokens are valid header values
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::security::cors::build_cors_layer;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required setting is absent.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// The BE endpoint is not a usable URL.
    #[error("invalid Doris BE endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// An address failed to parse.
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    /// A value that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// The inbound deadline would cut off a load before the client gives up.
    #[error("listener.request_timeout_secs ({listener}s) must be greater than load_client.request_timeout_secs ({load}s)")]
    TimeoutOrder { listener: u64, load: u64 },

    /// The cross-origin policy cannot be built.
    #[error("invalid CORS policy: {0}")]
    Cors(String),
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let doris = &config.doris;
    if doris.be_http.is_empty() {
        errors.push(ValidationError::Missing("DORIS_BE_HTTP"));
    } else {
        match url::Url::parse(&doris.be_http) {
            Ok(url) if url.host_str().is_some() => {}
            Ok(_) => errors.push(ValidationError::InvalidEndpoint {
                endpoint: doris.be_http.clone(),
                reason: "missing host".to_string(),
            }),
            Err(e) => errors.push(ValidationError::InvalidEndpoint {
                endpoint: doris.be_http.clone(),
                reason: e.to_string(),
            }),
        }
    }
    if doris.password.is_empty() {
        errors.push(ValidationError::Missing("DORIS_PASSWORD"));
    }
    if doris.database.is_empty() {
        errors.push(ValidationError::Missing("DORIS_DATABASE"));
    }
    if doris.table.is_empty() {
        errors.push(ValidationError::Missing("DORIS_TABLE"));
    }
    if doris.user.is_empty() {
        errors.push(ValidationError::Missing("DORIS_USER"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "bind address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("listener.request_timeout_secs"));
    }

    let client = &config.load_client;
    if client.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("load_client.request_timeout_secs"));
    }
    if client.max_in_flight == 0 {
        errors.push(ValidationError::Zero("load_client.max_in_flight"));
    }

    if client.request_timeout_secs > 0
        && config.listener.request_timeout_secs <= client.request_timeout_secs
    {
        errors.push(ValidationError::TimeoutOrder {
            listener: config.listener.request_timeout_secs,
            load: client.request_timeout_secs,
        });
    }

    if config.shutdown.grace_period_secs == 0 {
        errors.push(ValidationError::Zero("shutdown.grace_period_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Err(e) = build_cors_layer(&config.cors) {
        errors.push(ValidationError::Cors(e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
