//! Cross-origin resource sharing policy.
//!
//! # Responsibilities
//! - Translate [`CorsConfig`] into a `tower_http` CORS layer
//! - Answer preflight requests before routing or validation
//!
//! Browsers refuse credentialed responses that carry a wildcard origin, so
//! when credentials are allowed every wildcard (origin, methods, headers) is
//! served by echoing the request's own value instead.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

const WILDCARD: &str = "*";

/// Errors building the CORS layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorsConfigError {
    #[error("invalid allowed origin '{0}'")]
    Origin(String),

    #[error("invalid allowed method '{0}'")]
    Method(String),

    #[error("invalid allowed header '{0}'")]
    Header(String),
}

/// Build the CORS layer for `config`.
pub fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer, CorsConfigError> {
    let credentials = config.allow_credentials;

    let origin = if is_wildcard(&config.allowed_origins) {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|o| HeaderValue::from_str(o.trim()).map_err(|_| CorsConfigError::Origin(o.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    let methods = if is_wildcard(&config.allowed_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        let methods = config
            .allowed_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
                    .map_err(|_| CorsConfigError::Method(m.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowMethods::list(methods)
    };

    let headers = if is_wildcard(&config.allowed_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        let headers = config
            .allowed_headers
            .iter()
            .map(|h| HeaderName::try_from(h.trim()).map_err(|_| CorsConfigError::Header(h.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        AllowHeaders::list(headers)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials)
        .max_age(Duration::from_secs(config.max_age_secs)))
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v.trim() == WILDCARD)
}
