// src/error.rs

//! Unified error handling for the blog client.

use std::fmt;

use thiserror::Error;

/// Result type alias for client operations.
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

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend answered with an error
    #[error("API error for {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// Request did not complete within its deadline
    #[error("Request to {endpoint} timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    /// Request was cancelled because its view moved on
    #[error("Request aborted")]
    Aborted,

    /// Action needs a user name first
    #[error("A user identity is required for this action")]
    IdentityRequired,

    /// Action needs the blog post to be loaded first
    #[error("Blog post not loaded: {0}")]
    NotLoaded(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an API error with context.
    pub fn api(endpoint: impl Into<String>, status: Option<u16>, message: impl fmt::Display) -> Self {
        Self::Api {
            endpoint: endpoint.into(),
            status,
            message: message.to_string(),
        }
    }

    /// Create a not-loaded error.
    pub fn not_loaded(what: impl Into<String>) -> Self {
        Self::NotLoaded(what.into())
    }

    /// Whether the error came from a cancelled request.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
