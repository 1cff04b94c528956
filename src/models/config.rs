//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Blog listing behavior
    #[serde(default)]
    pub blog: BlogConfig,

    /// Contact and newsletter forms
    #[serde(default)]
    pub forms: FormsConfig,

    /// Analytics event pipe
    #[serde(default)]
    pub analytics: AnalyticsConfig,
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

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        url::Url::parse(&self.api.base_url)
            .map_err(|e| AppError::validation(format!("api.base_url is invalid: {e}")))?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.blog.page_size == 0 {
            return Err(AppError::validation("blog.page_size must be > 0"));
        }
        if self.blog.recent_days < 0 {
            return Err(AppError::validation("blog.recent_days must be >= 0"));
        }
        if self.blog.max_concurrent == 0 {
            return Err(AppError::validation("blog.max_concurrent must be > 0"));
        }
        Ok(())
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Report success with a `simulated` flag when form requests fail twice
    #[serde(default = "defaults::simulate_on_failure")]
    pub simulate_on_failure: bool,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
            simulate_on_failure: defaults::simulate_on_failure(),
        }
    }
}

/// Blog listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Posts per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Window for the "recent" filter, in days
    #[serde(default = "defaults::recent_days")]
    pub recent_days: i64,

    /// Maximum concurrent requests for bulk lookups
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
            recent_days: defaults::recent_days(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Form submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormsConfig {
    /// Block contact and newsletter signups until the captcha is solved
    #[serde(default = "defaults::require_captcha")]
    pub require_captcha: bool,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            require_captcha: defaults::require_captcha(),
        }
    }
}

/// Analytics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "defaults::analytics_enabled")]
    pub enabled: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::analytics_enabled(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "http://localhost:8000/api/".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; blogsync/0.1)".into()
    }
    pub fn simulate_on_failure() -> bool {
        true
    }

    // Blog defaults
    pub fn page_size() -> usize {
        6
    }
    pub fn recent_days() -> i64 {
        30
    }
    pub fn max_concurrent() -> usize {
        5
    }

    pub fn require_captcha() -> bool {
        true
    }
    pub fn analytics_enabled() -> bool {
        true
    }
}
