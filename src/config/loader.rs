//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{LogFormat, Password, ServiceConfig};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => write!(f, "Invalid value for {}: '{}'", var, value),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read the optional TOML file and overlay the process environment.
///
/// The result is normalized but not yet validated: callers run
/// [`validate_config`](crate::config::validation::validate_config) after
/// logging is set up so every problem gets reported.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    normalize(&mut config);
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests do not touch process state.
/// Empty values count as unset.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("LISTEN_ADDR") {
        config.listener.bind_address = v;
    }

    if let Some(v) = get("DORIS_BE_HTTP") {
        config.doris.be_http = v;
    }
    if let Some(v) = get("DORIS_DATABASE") {
        config.doris.database = v;
    }
    if let Some(v) = get("DORIS_TABLE") {
        config.doris.table = v;
    }
    if let Some(v) = get("DORIS_USER") {
        config.doris.user = v;
    }
    if let Some(v) = get("DORIS_PASSWORD") {
        config.doris.password = Password::new(v);
    }

    if let Some(v) = get("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = get("LOG_FORMAT") {
        config.observability.log_format = match v.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
    }
    if let Some(v) = get("DEBUG") {
        config.observability.debug = is_true(&v);
    }
    if let Some(v) = get("METRICS_ENABLED") {
        config.observability.metrics_enabled = is_true(&v);
    }
    if let Some(v) = get("METRICS_ADDR") {
        config.observability.metrics_address = v;
    }

    if let Some(v) = get("CORS_ALLOWED_ORIGIN") {
        config.cors.allowed_origins = split_list(&v);
    }
    if let Some(v) = get("CORS_ALLOWED_METHODS") {
        config.cors.allowed_methods = split_list(&v);
    }
    if let Some(v) = get("CORS_ALLOWED_HEADERS") {
        config.cors.allowed_headers = split_list(&v);
    }
    if let Some(v) = get("CORS_ALLOW_CREDENTIALS") {
        config.cors.allow_credentials = is_true(&v);
    }
    if let Some(v) = get("CORS_MAX_AGE") {
        config.cors.max_age_secs = parse_u64("CORS_MAX_AGE", &v)?;
    }

    if let Some(v) = get("SHUTDOWN_GRACE_SECS") {
        config.shutdown.grace_period_secs = parse_u64("SHUTDOWN_GRACE_SECS", &v)?;
    }

    Ok(())
}

/// Ensure the BE endpoint carries a scheme and no trailing slash.
pub fn normalize(config: &mut ServiceConfig) {
    let endpoint = config.doris.be_http.trim();
    if endpoint.is_empty() {
        config.doris.be_http = String::new();
        return;
    }
    let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };
    config.doris.be_http = endpoint.trim_end_matches('/').to_string();
}

fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("DORIS_BE_HTTP", "be:8040"),
                ("DORIS_PASSWORD", "pw-123456"),
                ("DORIS_DATABASE", "events"),
                ("LOG_FORMAT", "JSON"),
                ("DEBUG", "true"),
                ("CORS_ALLOWED_ORIGIN", "https://a.example, https://b.example"),
                ("CORS_ALLOW_CREDENTIALS", "true"),
                ("CORS_MAX_AGE", "600"),
            ]),
        )
        .unwrap();

        assert_eq!(config.doris.be_http, "be:8040");
        assert_eq!(config.doris.password.expose(), "pw-123456");
        assert_eq!(config.doris.database, "events");
        assert_eq!(config.doris.user, "devops");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.observability.debug);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.cors.allow_credentials);
        assert_eq!(config.cors.max_age_secs, 600);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(&mut config, env(&[("DORIS_DATABASE", ""), ("DEBUG", "  ")])).unwrap();
        assert_eq!(config.doris.database, "video");
        assert!(!config.observability.debug);
    }

    #[test]
    fn bad_numeric_env_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("CORS_MAX_AGE", "soon")])).unwrap_err();
        assert!(err.to_string().contains("CORS_MAX_AGE"));
    }

    #[test]
    fn endpoint_normalization() {
        let mut config = ServiceConfig::default();

        config.doris.be_http = "doris-be:8040/".to_string();
        normalize(&mut config);
        assert_eq!(config.doris.be_http, "http://doris-be:8040");

        config.doris.be_http = "https://doris-be:8040".to_string();
        normalize(&mut config);
        assert_eq!(config.doris.be_http, "https://doris-be:8040");

        config.doris.be_http = "   ".to_string();
        normalize(&mut config);
        assert_eq!(config.doris.be_http, "");
    }

    #[test]
    fn file_values_are_loaded() {
        let path = std::env::temp_dir().join(format!("doris-webhook-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[listener]\nmax_body_bytes = 4096\n\n[load_client]\nmax_in_flight = 7\n",
        )
        .unwrap();

        let config = load_config(Some(&path));
        let _ = fs::remove_file(&path);
        let config = config.unwrap();
        assert_eq!(config.listener.max_body_bytes, 4096);
        assert_eq!(config.load_client.max_in_flight, 7);
        assert_eq!(config.load_client.max_redirects, 10);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("doris-webhook-bad-{}.toml", std::process::id()));
        fs::write(&path, "[listener\n").unwrap();

        let err = load_config(Some(&path));
        let _ = fs::remove_file(&path);
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/doris-webhook.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
