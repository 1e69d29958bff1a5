//! Chat session: fixed configuration plus committed turn history

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizlens_constant::prompt::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, SYSTEM_INSTRUCTION};
use bizlens_llms::{GenerateRequest, Message, Provider};

use crate::error::{ChatError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
        }
    }
}

impl SessionConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ChatError::Config("model must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ChatError::Config(format!(
                "temperature must be within [0, 1], got {}",
                self.temperature
            )));
        }
        if self.max_output_tokens == Some(0) {
            return Err(ChatError::Config(
                "max output tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// One conversation with the backend.
///
/// History only grows through [`ChatSession::commit_turn`], one user prompt
/// and one model reply at a time.
pub struct ChatSession {
    pub id: SessionId,
    pub config: SessionConfig,
    pub created_at: DateTime<Utc>,
    provider: Arc<dyn Provider>,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(config: SessionConfig, provider: Arc<dyn Provider>) -> Self {
        Self {
            id: SessionId::new(),
            config,
            created_at: Utc::now(),
            provider,
            history: Vec::new(),
        }
    }

    pub fn provider(&self) -> Arc<dyn Provider> {
        Arc::clone(&self.provider)
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of committed turns.
    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }

    /// Request for the next turn: system instruction, committed history,
    /// then the new prompt.
    pub fn build_request(&self, prompt: &str) -> GenerateRequest {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(self.config.system_instruction.clone()));
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(prompt));

        let mut request =
            GenerateRequest::new(self.config.model.clone(), messages).with_temperature(self.config.temperature);
        if let Some(max) = self.config.max_output_tokens {
            request = request.with_max_tokens(max);
        }
        request
    }

    pub fn commit_turn(&mut self, prompt: impl Into<String>, reply: impl Into<String>) {
        self.history.push(Message::user(prompt));
        self.history.push(Message::assistant(reply));
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("provider", &self.provider.provider_id())
            .field("model", &self.config.model)
            .field("turns", &self.turn_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bizlens_llms::{GenerateStream, Headers, Role};

    struct NullProvider;

    #[async_trait]
    impl Provider for NullProvider {
        fn provider_id(&self) -> &str {
            "null"
        }

        fn build_headers(&self, _custom: Option<&Headers>) -> Headers {
            Headers::new()
        }

        async fn stream(&self, _request: GenerateRequest) -> bizlens_llms::Result<GenerateStream> {
            Ok(GenerateStream::from_events(Vec::new()))
        }
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.system_instruction.starts_with("You are an expert Senior Business Analyst"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        for t in [-0.1, 1.5, f32::NAN] {
            let err = SessionConfig::default().with_temperature(t).validate().unwrap_err();
            assert!(matches!(err, ChatError::Config(_)));
        }
        assert!(SessionConfig::default().with_temperature(0.0).validate().is_ok());
        assert!(SessionConfig::default().with_temperature(1.0).validate().is_ok());
    }

    #[test]
    fn test_build_request_order() {
        let mut session = ChatSession::new(
            SessionConfig::new("m").with_max_output_tokens(512),
            Arc::new(NullProvider),
        );
        session.commit_turn("p1", "r1");

        let request = session.build_request("p2");
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(request.messages[3].content, "p2");
        assert_eq!(request.options.max_tokens, Some(512));
        assert_eq!(request.options.temperature, Some(0.7));
        assert_eq!(session.turn_count(), 1);
    }
}
