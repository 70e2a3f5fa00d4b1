//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub allowed_origin: String,
    /// When set, proxy routes require `Authorization: Bearer <token>`.
    pub proxy_api_token: Option<String>,
    pub google_api_key: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub magisterium_api_key: String,
    pub magisterium_api_url: String,
    pub magisterium_model: String,
    pub calendar_api_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:5173");
        let proxy_api_token = lookup("PROXY_API_TOKEN").filter(|t| !t.is_empty());

        // --- API Keys ---
        let google_api_key = required("GOOGLE_API_KEY")?;
        let magisterium_api_key = required("MAGISTERIUM_API_KEY")?;

        // --- Upstream Endpoints and Models ---
        let gemini_api_base = var_or(
            "GEMINI_API_BASE",
            "https://generativelanguage.googleapis.com/v1beta/openai",
        );
        let gemini_model = var_or("GEMINI_MODEL", "gemini-2.5-pro-preview-03-25");
        let magisterium_api_url = var_or(
            "MAGISTERIUM_API_URL",
            "https://www.magisterium.com/api/v1/chat/completions",
        );
        let magisterium_model = var_or("MAGISTERIUM_MODEL", "magisterium-1");
        let calendar_api_url = var_or(
            "CALENDAR_API_URL",
            "http://calapi.inadiutorium.cz/api/v0/en/calendars/default",
        );

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            proxy_api_token,
            google_api_key,
            gemini_api_base,
            gemini_model,
            magisterium_api_key,
            magisterium_api_url,
            magisterium_model,
            calendar_api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_required_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g"),
            ("MAGISTERIUM_API_KEY", "m"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.magisterium_model, "magisterium-1");
        assert!(config.proxy_api_token.is_none());
    }

    #[test]
    fn test_missing_key_is_reported() {
        let result = Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "g")]));
        assert!(matches!(result, Err(ConfigError::MissingVar(v)) if v == "MAGISTERIUM_API_KEY"));

        let result = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "  "),
            ("MAGISTERIUM_API_KEY", "m"),
        ]));
        assert!(matches!(result, Err(ConfigError::MissingVar(v)) if v == "GOOGLE_API_KEY"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g"),
            ("MAGISTERIUM_API_KEY", "m"),
            ("BIND_ADDRESS", "not-an-address"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(v, _)) if v == "BIND_ADDRESS"));

        let result = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g"),
            ("MAGISTERIUM_API_KEY", "m"),
            ("RUST_LOG", "loud"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(v, _)) if v == "RUST_LOG"));
    }
}
