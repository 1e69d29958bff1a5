//! Gemini provider implementation

use super::convert::{describe_error_body, to_gemini_request};
use super::stream::create_stream;
use super::types::{GeminiConfig, GeminiModelList};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::{GenerateRequest, GenerateStream, Headers};
use async_trait::async_trait;
use reqwest::Client;
use reqwest_eventsource::EventSource;

/// Google Gemini provider
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Environment variable for API key
    pub const API_KEY_ENV: &'static str = "GEMINI_API_KEY";

    /// Generic fallback checked when [`Self::API_KEY_ENV`] is unset
    pub const FALLBACK_API_KEY_ENV: &'static str = "API_KEY";

    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey("gemini".to_string()));
        }

        let client = Client::new();
        Ok(Self { config, client })
    }

    /// Create provider from environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(Self::API_KEY_ENV)
            .or_else(|_| std::env::var(Self::FALLBACK_API_KEY_ENV))
            .map_err(|_| Error::MissingApiKey("gemini".to_string()))?;

        Self::new(GeminiConfig::new(api_key))
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}models/{}:{}", self.config.base_url, model, method)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("x-goog-api-key", self.config.api_key.clone());
        headers.insert("Content-Type", "application/json");

        if let Some(custom) = custom_headers {
            headers.merge_with(custom);
        }

        headers
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}models", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.build_headers(None).to_reqwest_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::provider_error(format!(
                "Gemini API error {}: {}",
                status,
                describe_error_body(&error_text)
            )));
        }

        let list: GeminiModelList = response.json().await?;
        Ok(list
            .models
            .into_iter()
            .map(|m| {
                m.name
                    .strip_prefix("models/")
                    .map(str::to_string)
                    .unwrap_or(m.name)
            })
            .collect())
    }

    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream> {
        let url = format!(
            "{}?alt=sse",
            self.model_url(&request.model, "streamGenerateContent")
        );
        let gemini_request = to_gemini_request(&request)?;
        let headers = self.build_headers(request.options.headers.as_ref());

        #[cfg(feature = "tracing")]
        tracing::debug!(model = %request.model, messages = request.messages.len(), "gemini stream");

        let req_builder = self
            .client
            .post(&url)
            .headers(headers.to_reqwest_headers())
            .json(&gemini_request);

        let event_source = EventSource::new(req_builder)
            .map_err(|e| Error::stream_error(format!("Failed to create event source: {}", e)))?;

        create_stream(event_source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, StreamEvent};
    use futures::StreamExt;
    use mockito::Matcher;

    fn provider_for(server: &mockito::Server) -> GeminiProvider {
        GeminiProvider::new(GeminiConfig::new("test-key").with_base_url(server.url())).unwrap()
    }

    fn request() -> GenerateRequest {
        GenerateRequest::new(
            "gemini-test",
            vec![Message::system("be brief"), Message::user("How is retail doing?")],
        )
        .with_temperature(0.7)
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = GeminiProvider::new(GeminiConfig::new("  ")).err().unwrap();
        assert!(matches!(err, Error::MissingApiKey(p) if p == "gemini"));
    }

    #[test]
    fn test_headers_carry_api_key() {
        let provider = GeminiProvider::new(GeminiConfig::new("k-123")).unwrap();
        let mut custom = Headers::new();
        custom.insert("x-request-id", "r1");
        let headers = provider.build_headers(Some(&custom));
        assert_eq!(headers.get("x-goog-api-key"), Some("k-123"));
        assert_eq!(headers.get("x-request-id"), Some("r1"));
    }

    #[test]
    fn test_model_url_strips_resource_prefix() {
        let provider = GeminiProvider::new(GeminiConfig::new("k")).unwrap();
        assert_eq!(
            provider.model_url("models/gemini-test", "streamGenerateContent"),
            format!("{}models/gemini-test:streamGenerateContent", super::super::types::DEFAULT_BASE_URL)
        );
    }

    #[tokio::test]
    async fn test_stream_yields_deltas_then_finish() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Revenue \"}]}}],\"responseId\":\"r-1\"}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"is up.\"}]},\"finishReason\":\"STOP\"}],",
            "\"usageMetadata\":{\"promptTokenCount\":20,\"candidatesTokenCount\":4,\"totalTokenCount\":24}}\n\n",
        );
        let mock = server
            .mock(
                "POST",
                Matcher::Regex(r"^/models/gemini-test:streamGenerateContent".to_string()),
            )
            .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "be brief"}]},
                "contents": [{"role": "user", "parts": [{"text": "How is retail doing?"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let events: Vec<_> = provider
            .stream(request())
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        mock.assert_async().await;
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { delta, .. } => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Revenue is up.");
        assert_eq!(events.first(), Some(&StreamEvent::start("r-1")));
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Finish { usage, .. }) if usage.total_tokens == 24
        ));
    }

    #[tokio::test]
    async fn test_stream_http_error_surfaces_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "POST",
                Matcher::Regex(r"streamGenerateContent".to_string()),
            )
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":{"code":403,"message":"API key not valid.","status":"PERMISSION_DENIED"}}"#,
            )
            .create_async()
            .await;

        let provider = provider_for(&server);
        let results: Vec<_> = provider.stream(request()).await.unwrap().collect().await;

        assert_eq!(results.len(), 1);
        let err = results[0].as_ref().unwrap_err().to_string();
        assert!(err.contains("403"));
        assert!(err.contains("PERMISSION_DENIED: API key not valid."));
    }

    #[tokio::test]
    async fn test_list_models_strips_prefix() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/models")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models":[{"name":"models/gemini-a"},{"name":"models/gemini-b"}]}"#)
            .create_async()
            .await;

        let models = provider_for(&server).list_models().await.unwrap();
        assert_eq!(models, vec!["gemini-a", "gemini-b"]);
    }
}
