//! OpenAI-specific types

use serde::{Deserialize, Serialize};

/// Default API root, without a trailing slash
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL (default: https://api.openai.com/v1)
    pub base_url: String,
    /// Organization ID (optional)
    pub organization_id: Option<String>,
}

impl OpenAIConfig {
    /// Create new config with API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization_id: None,
        }
    }

    /// Set base URL. A full `/chat/completions` endpoint is accepted and trimmed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        let url = url.trim_end_matches('/');
        let url = url.strip_suffix("/chat/completions").unwrap_or(url);
        self.base_url = url.to_string();
        self
    }

    /// Set organization ID
    pub fn with_organization_id(mut self, org_id: impl Into<String>) -> Self {
        self.organization_id = Some(org_id.into());
        self
    }
}

/// Streaming chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
    pub stream_options: OpenAIStreamOptions,
}

#[derive(Debug, Serialize)]
pub struct OpenAIStreamOptions {
    pub include_usage: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// One `data:` payload of a streamed completion
#[derive(Debug, Deserialize)]
pub struct OpenAIStreamChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIStreamChoice {
    #[serde(default)]
    pub delta: OpenAIStreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAIStreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// `GET /models` response
#[derive(Debug, Deserialize)]
pub struct OpenAIModelList {
    #[serde(default)]
    pub data: Vec<OpenAIModel>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIModel {
    pub id: String,
}

/// Error envelope
#[derive(Debug, Deserialize)]
pub struct OpenAIErrorWrapper {
    pub error: OpenAIError,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}
