// src/error.rs

//! Unified error handling for the prospector application.

use std::fmt;

use thiserror::Error;

/// Result type alias for prospector operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Search provider failed for one query
    #[error("Search provider error for '{query}': {message}")]
    Provider { query: String, message: String },

    /// Website analysis failed for one URL
    #[error("Analysis failed for {url}: {message}")]
    Analysis { url: String, message: String },

    /// Daily search quota used up
    #[error("Daily search quota exhausted ({used}/{limit})")]
    QuotaExhausted { used: u32, limit: u32 },

    /// Continuous search started twice
    #[error("Continuous search is already running")]
    AlreadyRunning,
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a provider error scoped to one query.
    pub fn provider(query: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Provider {
            query: query.into(),
            message: message.to_string(),
        }
    }

    /// Create an analysis error scoped to one URL.
    pub fn analysis(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Analysis {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
