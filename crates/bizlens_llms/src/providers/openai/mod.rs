//! OpenAI-compatible provider module
//!
//! Speaks the `/chat/completions` dialect, so it also covers self-hosted
//! gateways that mirror the OpenAI API.

mod convert;
mod provider;
mod stream;
mod types;

pub use provider::OpenAIProvider;
pub use types::OpenAIConfig;
