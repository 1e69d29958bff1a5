//! Unified request, response and stream types shared by all providers

use std::collections::BTreeMap;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use pin_project::pin_project;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Case-preserving HTTP header bag that providers merge and hand to reqwest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge_with(&mut self, other: &Headers) {
        for (k, v) in &other.inner {
            self.inner.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Convert to a reqwest header map. Entries that are not valid HTTP
    /// header names or values are skipped.
    pub fn to_reqwest_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in &self.inner {
            if let (Ok(name), Ok(value)) =
                (HeaderName::from_bytes(k.as_bytes()), HeaderValue::from_str(v))
            {
                map.insert(name, value);
            }
        }
        map
    }
}

/// Generation knobs common to every backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Extra headers merged over the provider defaults. Never serialized.
    #[serde(skip)]
    pub headers: Option<Headers>,
}

/// A full chat request: model id, ordered messages and options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerateOptions::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.options.headers = Some(headers);
        self
    }

    /// All system messages joined by blank lines, or `None` if there are none.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReasonKind {
    Stop,
    Length,
    ContentFilter,
    Other,
}

/// Why generation stopped, with the provider's raw value when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishReason {
    pub unified: FinishReasonKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl FinishReason {
    pub fn new(unified: FinishReasonKind) -> Self {
        Self { unified, raw: None }
    }

    pub fn with_raw(unified: FinishReasonKind, raw: impl Into<String>) -> Self {
        Self {
            unified,
            raw: Some(raw.into()),
        }
    }
}

/// Unified streaming event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start { id: String },
    TextDelta { id: String, delta: String },
    Finish { usage: Usage, reason: FinishReason },
    /// Backend-reported failure that arrived as data rather than transport error.
    Error { message: String },
}

impl StreamEvent {
    pub fn start(id: impl Into<String>) -> Self {
        Self::Start { id: id.into() }
    }

    pub fn text_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::TextDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    pub fn finish(usage: Usage, reason: FinishReason) -> Self {
        Self::Finish { usage, reason }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

pub type BoxedEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Ordered, finite stream of [`StreamEvent`]s for one request.
#[pin_project]
pub struct GenerateStream {
    #[pin]
    inner: BoxedEventStream,
}

impl GenerateStream {
    pub fn new(inner: BoxedEventStream) -> Self {
        Self { inner }
    }

    /// Stream that replays a fixed list of events.
    pub fn from_events(events: Vec<Result<StreamEvent>>) -> Self {
        Self::new(Box::pin(futures::stream::iter(events)))
    }
}

impl Stream for GenerateStream {
    type Item = Result<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

impl std::fmt::Debug for GenerateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use futures::StreamExt;

    #[test]
    fn test_request_builder() {
        let req = GenerateRequest::new(
            "gemini-test",
            vec![Message::system("be brief"), Message::user("hi")],
        )
        .with_temperature(0.7)
        .with_max_tokens(256);

        assert_eq!(req.model, "gemini-test");
        assert_eq!(req.options.temperature, Some(0.7));
        assert_eq!(req.options.max_tokens, Some(256));
        assert_eq!(req.system_prompt().as_deref(), Some("be brief"));
    }

    #[test]
    fn test_system_prompt_absent() {
        let req = GenerateRequest::new("m", vec![Message::user("hi")]);
        assert!(req.system_prompt().is_none());
    }

    #[test]
    fn test_headers_merge_overrides() {
        let mut base = Headers::new();
        base.insert("Content-Type", "application/json");
        base.insert("x-goog-api-key", "old");

        let mut custom = Headers::new();
        custom.insert("x-goog-api-key", "new");
        custom.insert("x-trace", "1");

        base.merge_with(&custom);
        assert_eq!(base.len(), 3);
        assert_eq!(base.get("x-goog-api-key"), Some("new"));
        assert_eq!(base.to_reqwest_headers().len(), 3);
    }

    #[test]
    fn test_invalid_header_skipped() {
        let mut headers = Headers::new();
        headers.insert("bad header", "v");
        headers.insert("ok", "v");
        assert_eq!(headers.to_reqwest_headers().len(), 1);
    }

    #[test]
    fn test_usage_total() {
        let usage = Usage::new(12, 30);
        assert_eq!(usage.total_tokens, 42);
    }

    #[test]
    fn test_stream_event_serialization() {
        let json = serde_json::to_string(&StreamEvent::text_delta("r1", "Hello")).unwrap();
        assert_eq!(json, r#"{"type":"text_delta","id":"r1","delta":"Hello"}"#);
    }

    #[test]
    fn test_generate_stream_from_events() {
        let stream = GenerateStream::from_events(vec![
            Ok(StreamEvent::text_delta("", "a")),
            Ok(StreamEvent::text_delta("", "b")),
            Err(Error::stream_error("boom")),
        ]);
        let items: Vec<_> = tokio_test::block_on(stream.collect());
        assert_eq!(items.len(), 3);
        assert!(items[2].is_err());
    }
}
