//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Taxonomy;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search provider settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Website analyzer settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Query planning and result caps
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Daily provider request ceiling
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Sector and region keyword tables
    #[serde(default)]
    pub taxonomy: Taxonomy,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.search.user_agent.trim().is_empty() {
            return Err(AppError::validation("search.user_agent is empty"));
        }
        if self.search.timeout_secs == 0 {
            return Err(AppError::validation("search.timeout_secs must be > 0"));
        }
        if self.analyzer.user_agent.trim().is_empty() {
            return Err(AppError::validation("analyzer.user_agent is empty"));
        }
        if self.analyzer.timeout_secs == 0 {
            return Err(AppError::validation("analyzer.timeout_secs must be > 0"));
        }
        if self.discovery.max_queries == 0 {
            return Err(AppError::validation("discovery.max_queries must be > 0"));
        }
        if self.discovery.terms_per_key == 0 {
            return Err(AppError::validation("discovery.terms_per_key must be > 0"));
        }
        if self.discovery.per_call_cap == 0 {
            return Err(AppError::validation("discovery.per_call_cap must be > 0"));
        }
        if self.discovery.result_cap == 0 {
            return Err(AppError::validation("discovery.result_cap must be > 0"));
        }
        if self.discovery.analysis_concurrency == 0 {
            return Err(AppError::validation(
                "discovery.analysis_concurrency must be > 0",
            ));
        }
        if self.quota.daily_limit == 0 {
            return Err(AppError::validation("quota.daily_limit must be > 0"));
        }
        self.taxonomy.validate()
    }
}

/// Which search backend to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Google,
    DuckDuckGo,
}

/// Search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Endpoint override (defaults to the provider's public endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Google Custom Search API key (`GOOGLE_API_KEY` takes precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Google Custom Search engine id (`GOOGLE_CX` takes precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cx: Option<String>,

    /// User-Agent header for search requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            endpoint: None,
            api_key: None,
            cx: None,
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Website analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// User-Agent header for page fetches
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Page fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Responses slower than this count as a "slow loading" issue
    #[serde(default = "defaults::slow_response")]
    pub slow_response_ms: u64,

    /// Artificial delay per URL for the simulated analyzer
    #[serde(default = "defaults::simulated_latency")]
    pub simulated_latency_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            slow_response_ms: defaults::slow_response(),
            simulated_latency_ms: defaults::simulated_latency(),
        }
    }
}

/// Query planning limits and result caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Most queries planned per search call
    #[serde(default = "defaults::max_queries")]
    pub max_queries: usize,

    /// Terms taken from each sector and region list
    #[serde(default = "defaults::terms_per_key")]
    pub terms_per_key: usize,

    /// Stop issuing queries once this many prospects are collected
    #[serde(default = "defaults::per_call_cap")]
    pub per_call_cap: usize,

    /// Hard limit on prospects returned by one search call
    #[serde(default = "defaults::result_cap")]
    pub result_cap: usize,

    /// Candidates analyzed at once within a query
    #[serde(default = "defaults::analysis_concurrency")]
    pub analysis_concurrency: usize,

    /// Pause between continuous search rounds in milliseconds
    #[serde(default = "defaults::pace")]
    pub pace_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_queries: defaults::max_queries(),
            terms_per_key: defaults::terms_per_key(),
            per_call_cap: defaults::per_call_cap(),
            result_cap: defaults::result_cap(),
            analysis_concurrency: defaults::analysis_concurrency(),
            pace_ms: defaults::pace(),
        }
    }
}

/// Daily provider request ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "defaults::daily_limit")]
    pub daily_limit: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: defaults::daily_limit(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; prospector/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn slow_response() -> u64 {
        3000
    }
    pub fn simulated_latency() -> u64 {
        0
    }

    pub fn max_queries() -> usize {
        10
    }
    pub fn terms_per_key() -> usize {
        2
    }
    pub fn per_call_cap() -> usize {
        20
    }
    pub fn result_cap() -> usize {
        50
    }
    pub fn analysis_concurrency() -> usize {
        1
    }
    pub fn pace() -> u64 {
        1000
    }

    pub fn daily_limit() -> u32 {
        100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.search.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_caps() {
        let mut config = Config::default();
        config.discovery.per_call_cap = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.discovery.analysis_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [search]
            provider = "duckduckgo"

            [discovery]
            pace_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.search.provider, ProviderKind::DuckDuckGo);
        assert_eq!(config.discovery.pace_ms, 250);
        assert_eq!(config.discovery.max_queries, 10);
        assert_eq!(config.quota.daily_limit, 100);
        assert_eq!(config.taxonomy.regions.len(), 18);
    }

    #[test]
    fn default_config_survives_toml_roundtrip() {
        let text = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.taxonomy, Taxonomy::default());
    }
}
