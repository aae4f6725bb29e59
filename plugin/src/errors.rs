//! Error types for the deploy tool

use thiserror::Error;

/// Main error type for the deploy tool
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Listen error: {0}")]
    ListenError(String),

    #[error("Team error: {0}")]
    TeamError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PluginError {
    fn from(err: anyhow::Error) -> Self {
        PluginError::Internal(err.to_string())
    }
}
