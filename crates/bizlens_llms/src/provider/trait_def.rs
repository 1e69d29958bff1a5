use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateRequest, GenerateStream, Headers};

/// A chat completion backend.
///
/// Implementations are stateless with respect to conversations: the caller
/// sends the full message history on every request.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, e.g. `"gemini"`.
    fn provider_id(&self) -> &str;

    /// Default request headers merged with any per-request overrides.
    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers;

    /// Models this provider can serve.
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Run a request and stream events as they arrive.
    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream>;
}
