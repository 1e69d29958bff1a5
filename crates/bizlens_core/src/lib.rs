//! bizlens_core: business context and streaming chat sessions.
//!
//! A [`ChatCoordinator`] owns one live [`ChatSession`] at a time. Each
//! [`ChatCoordinator::send`] composes a prompt from the caller's
//! [`BusinessContext`] and message, streams the reply as cumulative
//! [`TurnEvent::Increment`]s, and finishes with a [`TurnOutcome`].

pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod message;
pub mod metrics;
pub mod session;

pub use config::{ChatConfig, ProviderKind, create_provider};
pub use context::{BusinessContext, build_context_block, compose_prompt, or_not_provided};
pub use coordinator::{
    ChatCoordinator, ProviderFactory, TurnEvent, TurnOutcome, TurnStatus, TurnStream,
};
pub use error::{ChatError, Result};
pub use message::{ChatMessage, MessageId, MessageRole, Transcript};
pub use metrics::{BusinessMetrics, Industry, ParseIndustryError};
pub use session::{ChatSession, SessionConfig, SessionId};
