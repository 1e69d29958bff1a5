//! Caller-side transcript of a chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizlens_constant::prompt::{CLEARED_GREETING, GREETING};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_streaming: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text, false)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Model, text, false)
    }

    fn new(role: MessageRole, text: impl Into<String>, is_streaming: bool) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            is_streaming,
        }
    }
}

/// Append-only list of messages. Individual messages are never removed;
/// [`Transcript::clear`] replaces the whole list at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript opened by the standard assistant greeting.
    pub fn with_greeting() -> Self {
        Self {
            messages: vec![ChatMessage::model(GREETING)],
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        let message = ChatMessage::user(text);
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// Append an empty model message that will be filled while streaming.
    pub fn begin_model(&mut self) -> MessageId {
        let message = ChatMessage::new(MessageRole::Model, String::new(), true);
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// Replace the text of a streaming message. Returns false if the id is
    /// unknown or the message has already finished.
    pub fn update_streaming(&mut self, id: &MessageId, text: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(message) if message.is_streaming => {
                message.text = text.into();
                true
            }
            _ => false,
        }
    }

    /// Set final text and clear the streaming flag.
    pub fn finish(&mut self, id: &MessageId, text: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(message) if message.is_streaming => {
                message.text = text.into();
                message.is_streaming = false;
                true
            }
            _ => false,
        }
    }

    /// Drop every message and restart with the "conversation cleared" greeting.
    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage::model(CLEARED_GREETING)];
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True while the last model message is still receiving text.
    pub fn is_streaming(&self) -> bool {
        self.messages.iter().any(|m| m.is_streaming)
    }

    fn get_mut(&mut self, id: &MessageId) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().rev().find(|m| &m.id == id)
    }
}
