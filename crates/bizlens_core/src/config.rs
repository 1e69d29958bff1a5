//! Runtime configuration for bizlens chat

use std::str::FromStr;
use std::sync::Arc;

use bizlens_constant::prompt::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use bizlens_llms::{GeminiProvider, OpenAIProvider, Provider};

use crate::coordinator::ProviderFactory;
use crate::error::{ChatError, Result};
use crate::session::SessionConfig;

/// Default model when the OpenAI-compatible backend is selected.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAI,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Gemini, ProviderKind::OpenAI];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::OpenAI => "OpenAI-compatible",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => GeminiProvider::API_KEY_ENV,
            ProviderKind::OpenAI => OpenAIProvider::API_KEY_ENV,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => DEFAULT_MODEL,
            ProviderKind::OpenAI => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" | "open-ai" => Ok(ProviderKind::OpenAI),
            other => Err(ChatError::Config(format!("unknown provider '{}'", other))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chat configuration: which backend to talk to and the session parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch backend. A model still at the previous backend's default follows
    /// the switch.
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        if self.model == self.provider.default_model() {
            self.model = provider.default_model().to_string();
        }
        self.provider = provider;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
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

    /// Load configuration from environment variables
    ///
    /// - `BIZLENS_PROVIDER` (`gemini` | `openai`); inferred from which API key
    ///   is set when absent
    /// - `BIZLENS_MODEL`
    /// - `BIZLENS_TEMPERATURE` (0..=1)
    /// - `BIZLENS_MAX_TOKENS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("BIZLENS_PROVIDER") {
            Some(name) => name.parse::<ProviderKind>()?,
            None => {
                if get(GeminiProvider::API_KEY_ENV).is_some()
                    || get(GeminiProvider::FALLBACK_API_KEY_ENV).is_some()
                {
                    ProviderKind::Gemini
                } else if get(OpenAIProvider::API_KEY_ENV).is_some() {
                    ProviderKind::OpenAI
                } else {
                    ProviderKind::Gemini
                }
            }
        };

        let mut config = Self::new().with_provider(provider);

        if let Some(model) = get("BIZLENS_MODEL") {
            config.model = model;
        }

        if let Some(raw) = get("BIZLENS_TEMPERATURE") {
            config.temperature = raw.trim().parse::<f32>().map_err(|_| {
                ChatError::Config(format!("BIZLENS_TEMPERATURE is not a number: {}", raw))
            })?;
        }

        if let Some(raw) = get("BIZLENS_MAX_TOKENS") {
            let max = raw.trim().parse::<u32>().map_err(|_| {
                ChatError::Config(format!("BIZLENS_MAX_TOKENS is not an integer: {}", raw))
            })?;
            config.max_output_tokens = Some(max);
        }

        config.session_config().validate()?;
        Ok(config)
    }

    /// Session parameters derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        let mut session = SessionConfig::new(self.model.clone()).with_temperature(self.temperature);
        if let Some(max) = self.max_output_tokens {
            session = session.with_max_output_tokens(max);
        }
        session
    }

    /// Factory building this backend from the environment for each new session.
    pub fn provider_factory(&self) -> ProviderFactory {
        let kind = self.provider;
        Arc::new(move |_session: &SessionConfig| create_provider(kind))
    }
}

/// Build a provider from its environment variables.
pub fn create_provider(kind: ProviderKind) -> bizlens_llms::Result<Arc<dyn Provider>> {
    match kind {
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::from_env()?)),
        ProviderKind::OpenAI => Ok(Arc::new(OpenAIProvider::from_env()?)),
    }
}
