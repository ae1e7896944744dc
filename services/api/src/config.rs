//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub generation_timeout: Duration,
    pub catalog_path: Option<PathBuf>,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds the configuration from an explicit set of variables.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty()).cloned();

        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        let max_upload_bytes = parse_number(&var, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;

        // --- Image Generation Settings ---
        // The key is optional: without it the service runs and reports the
        // missing credential instead of generating.
        let gemini_api_key = var("GEMINI_API_KEY").or_else(|| var("API_KEY"));
        let gemini_model =
            var("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash-image".to_string());
        let gemini_base_url = var("GEMINI_BASE_URL")
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = parse_number(&var, "GENERATION_TIMEOUT_SECS", 120)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GENERATION_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        // --- Catalog ---
        let catalog_path = var("CATALOG_PATH").map(PathBuf::from);

        Ok(Self {
            bind_address,
            log_level,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            generation_timeout: Duration::from_secs(timeout_secs as u64),
            catalog_path,
            cors_origin,
            max_upload_bytes,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

fn parse_number(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = Config::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.gemini_model, "gemini-2.5-flash-image");
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!config.has_api_key());
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn api_key_falls_back_to_generic_variable() {
        let config = Config::from_vars(vars(&[("API_KEY", "abc")])).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));

        let config =
            Config::from_vars(vars(&[("API_KEY", "abc"), ("GEMINI_API_KEY", "xyz")])).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("xyz"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = Config::from_vars(vars(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = Config::from_vars(vars(&[("BIND_ADDRESS", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "BIND_ADDRESS"));

        let err = Config::from_vars(vars(&[("GENERATION_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("GENERATION_TIMEOUT_SECS"));

        let err = Config::from_vars(vars(&[("RUST_LOG", "chatty")])).unwrap_err();
        assert!(err.to_string().contains("chatty"));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let config =
            Config::from_vars(vars(&[("GEMINI_BASE_URL", "http://localhost:9000/")])).unwrap();
        assert_eq!(config.gemini_base_url, "http://localhost:9000");
    }
}
