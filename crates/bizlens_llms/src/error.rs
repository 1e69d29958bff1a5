//! Error types shared by every provider

use thiserror::Error;

/// Errors raised while building, sending or streaming a completion request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing API key for provider: {0}")]
    MissingApiKey(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn provider_error(message: impl Into<String>) -> Self {
        Self::ProviderError(message.into())
    }

    pub fn stream_error(message: impl Into<String>) -> Self {
        Self::StreamError(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// True for errors that happen before any request leaves the process.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey(_) | Self::ProviderNotFound(_) | Self::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
