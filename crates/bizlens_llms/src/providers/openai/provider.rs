//! OpenAI provider implementation

use super::convert::{describe_error_body, to_openai_request};
use super::stream::create_stream;
use super::types::{OpenAIConfig, OpenAIModelList};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::{GenerateRequest, GenerateStream, Headers};
use async_trait::async_trait;
use reqwest::Client;
use reqwest_eventsource::EventSource;

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Environment variable for API key
    pub const API_KEY_ENV: &'static str = "OPENAI_API_KEY";

    /// Environment variable overriding the API root
    pub const BASE_URL_ENV: &'static str = "OPENAI_BASE_URL";

    /// Create a new OpenAI provider
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey("openai".to_string()));
        }

        let client = Client::new();
        Ok(Self { config, client })
    }

    /// Create provider from environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(Self::API_KEY_ENV)
            .map_err(|_| Error::MissingApiKey("openai".to_string()))?;

        let mut config = OpenAIConfig::new(api_key);
        if let Ok(base_url) = std::env::var(Self::BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        Self::new(config)
    }

    async fn error_from(response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        Error::provider_error(format!(
            "OpenAI API error {}: {}",
            status,
            describe_error_body(&error_text)
        ))
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Authorization", format!("Bearer {}", self.config.api_key));
        headers.insert("Content-Type", "application/json");

        if let Some(ref org_id) = self.config.organization_id {
            headers.insert("OpenAI-Organization", org_id.clone());
        }

        if let Some(custom) = custom_headers {
            headers.merge_with(custom);
        }

        headers
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.build_headers(None).to_reqwest_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let list: OpenAIModelList = response.json().await?;
        let mut models: Vec<String> = list.data.into_iter().map(|m| m.id).collect();
        models.sort();
        Ok(models)
    }

    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let openai_request = to_openai_request(&request)?;
        let headers = self.build_headers(request.options.headers.as_ref());

        #[cfg(feature = "tracing")]
        tracing::debug!(model = %request.model, messages = request.messages.len(), "openai stream");

        let req_builder = self
            .client
            .post(&url)
            .headers(headers.to_reqwest_headers())
            .json(&openai_request);

        let event_source = EventSource::new(req_builder)
            .map_err(|e| Error::stream_error(format!("Failed to create event source: {}", e)))?;

        create_stream(event_source).await
    }
}
