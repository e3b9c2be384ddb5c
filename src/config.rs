// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading configuration
//! from the storage directory and resolving provider credentials.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, SearchConfig};

/// Environment variable holding the Google API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable holding the Google search engine id.
pub const CX_ENV: &str = "GOOGLE_CX";

/// Credentials for the Google Custom Search API.
#[derive(Clone)]
pub struct SearchCredentials {
    pub api_key: String,
    pub cx: String,
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"***")
            .field("cx", &self.cx)
            .finish()
    }
}

impl SearchCredentials {
    /// Resolve credentials from the environment, then the config file.
    pub fn resolve(config: &SearchConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_with(
        config: &SearchConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let pick = |env: &str, configured: &Option<String>| {
            lookup(env)
                .or_else(|| configured.clone())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        match (pick(API_KEY_ENV, &config.api_key), pick(CX_ENV, &config.cx)) {
            (Some(api_key), Some(cx)) => Ok(Self { api_key, cx }),
            _ => Err(AppError::config(format!(
                "Google API key or CX missing: set {API_KEY_ENV} and {CX_ENV} or search.api_key and search.cx"
            ))),
        }
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file is missing or unreadable.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Config::default();
    }
    Config::load_or_default(path)
}

/// Load and validate the configuration at `path`.
pub fn load_validated(path: &Path) -> Result<Config> {
    let config = load_config(path);
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;
    Ok(config)
}

/// Load and validate the configuration stored under `storage_dir`.
pub fn load_all(storage_dir: &Path) -> Result<Config> {
    load_validated(&storage_dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_credentials_from_config() {
        let config = SearchConfig {
            api_key: Some("key".into()),
            cx: Some("cx".into()),
            ..SearchConfig::default()
        };
        let creds = SearchCredentials::resolve_with(&config, no_env).unwrap();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.cx, "cx");
    }

    #[test]
    fn test_env_takes_precedence() {
        let config = SearchConfig {
            api_key: Some("file-key".into()),
            cx: Some("file-cx".into()),
            ..SearchConfig::default()
        };
        let creds = SearchCredentials::resolve_with(&config, |name| {
            (name == API_KEY_ENV).then(|| "env-key".to_string())
        })
        .unwrap();
        assert_eq!(creds.api_key, "env-key");
        assert_eq!(creds.cx, "file-cx");
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let config = SearchConfig {
            api_key: Some("key".into()),
            cx: Some("  ".into()),
            ..SearchConfig::default()
        };
        let err = SearchCredentials::resolve_with(&config, no_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let creds = SearchCredentials {
            api_key: "secret".into(),
            cx: "cx".into(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn test_load_all_defaults_without_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_all(tmp.path()).unwrap();
        assert_eq!(config.discovery.result_cap, 50);
    }

    #[test]
    fn test_load_all_rejects_invalid_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[discovery]\nresult_cap = 0\n",
        )
        .unwrap();
        assert!(load_all(tmp.path()).is_err());
    }
}
