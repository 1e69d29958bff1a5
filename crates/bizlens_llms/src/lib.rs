//! bizlens_llms: provider-agnostic chat completions with streaming support.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  ProviderRegistry                    │
//! │  ┌──────────────────────────────────────────────┐   │
//! │  │  HashMap<String, Arc<dyn Provider>>           │   │
//! │  └──────────────────────────────────────────────┘   │
//! │                       │                              │
//! │          ┌────────────┼────────────┐                │
//! │          ▼            ▼            ▼                │
//! │   ┌───────────┐ ┌──────────┐ ┌──────────┐         │
//! │   │  Gemini   │ │  OpenAI  │ │ (future) │         │
//! │   │ Provider  │ │ Provider │ │          │         │
//! │   └───────────┘ └──────────┘ └──────────┘         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Every provider turns a [`GenerateRequest`] into a [`GenerateStream`] of
//! unified [`StreamEvent`]s.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bizlens_llms::{GeminiProvider, Provider, ProviderRegistry};
//!
//! let provider = GeminiProvider::from_env().unwrap();
//! let registry = ProviderRegistry::new().register("gemini", provider);
//! assert!(registry.get_provider("gemini").is_ok());
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;


// Re-export core abstractions
pub use error::{Error, Result};
pub use provider::{Provider, ProviderRegistry};

// Re-export provider implementations
#[cfg(feature = "gemini")]
pub use providers::GeminiProvider;
#[cfg(feature = "openai")]
pub use providers::OpenAIProvider;

// Re-export commonly used types
pub use types::{
    FinishReason, FinishReasonKind, GenerateOptions, GenerateRequest, GenerateStream, Headers,
    Message, Role, StreamEvent, Usage,
};
