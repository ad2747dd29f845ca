//! # Configuration
//!
//! Where the selection service lives and how long to wait for it.
//!
//! Resolution order: built-in defaults, then an optional TOML file, then the
//! `SELECTOR_API_URL` environment variable.
//!
//! ```toml
//! api_base_url = "https://selector.example.com"
//! request_timeout_secs = 20
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{SelectorError, SelectorResult};

/// Environment variable that overrides the service URL
pub const API_URL_ENV: &str = "SELECTOR_API_URL";

/// Service URL used for local development
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Client settings for the selection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Base URL without trailing slash (e.g., "http://localhost:8000")
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 10,
            user_agent: format!("ShaftSelector/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SelectorConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> SelectorResult<Self> {
        toml::from_str(text).map_err(|e| SelectorError::config(e.to_string()))
    }

    /// Load from an optional file, then apply the environment override.
    ///
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> SelectorResult<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let text = fs::read_to_string(p).map_err(|e| {
                    SelectorError::file_error("read config", p.display().to_string(), e.to_string())
                })?;
                Self::from_toml_str(&text)?
            }
            _ => SelectorConfig::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config = config.with_api_base_url(url);
        }
        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.api_base_url = trimmed.to_string();
        }
        self
    }

    /// Absolute URL for an endpoint path such as "/materials"
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
