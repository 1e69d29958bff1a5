//! Configuration for observability/telemetry

use serde::{Deserialize, Serialize};

/// Filter used when neither the config nor the environment sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to exported spans
    pub service_name: String,

    /// Service version (optional)
    pub service_version: Option<String>,

    /// OTLP endpoint for span export (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,

    /// Write formatted log lines to stderr
    pub enable_console: bool,

    /// `EnvFilter` directive, e.g. "warn" or "bizlens_core=debug"
    pub log_level: Option<String>,

    /// Additional resource attributes (key-value pairs)
    pub resource_attributes: Vec<(String, String)>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "bizlens".to_string(),
            service_version: None,
            otlp_endpoint: None,
            enable_console: true,
            log_level: None,
            resource_attributes: Vec::new(),
        }
    }
}

impl ObservabilityConfig {
    /// Create a new configuration with service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Set OTLP endpoint
    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Add resource attribute
    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.resource_attributes.push((key.into(), value.into()));
        self
    }

    /// The filter directive that `init` will apply.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `OTEL_SERVICE_NAME` → service_name
    /// - `OTEL_SERVICE_VERSION` → service_version
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `BIZLENS_LOG` or `RUST_LOG` → log_level
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            service_name: non_empty("OTEL_SERVICE_NAME").unwrap_or_else(|| "bizlens".to_string()),
            service_version: non_empty("OTEL_SERVICE_VERSION"),
            // OTLP only when explicitly set; otherwise console-only.
            otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
            enable_console: true,
            log_level: non_empty("BIZLENS_LOG").or_else(|| non_empty("RUST_LOG")),
            resource_attributes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_console_only() {
        let config = ObservabilityConfig::from_lookup(lookup(&[]));
        assert_eq!(config.service_name, "bizlens");
        assert!(config.otlp_endpoint.is_none());
        assert!(config.enable_console);
        assert_eq!(config.effective_log_level(), "warn");
    }

    #[test]
    fn test_bizlens_log_wins_over_rust_log() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            ("BIZLENS_LOG", "debug"),
            ("RUST_LOG", "trace"),
        ]));
        assert_eq!(config.effective_log_level(), "debug");

        let config = ObservabilityConfig::from_lookup(lookup(&[("RUST_LOG", "info")]));
        assert_eq!(config.effective_log_level(), "info");
    }

    #[test]
    fn test_blank_endpoint_ignored() {
        let config =
            ObservabilityConfig::from_lookup(lookup(&[("OTEL_EXPORTER_OTLP_ENDPOINT", "  ")]));
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: ObservabilityConfig =
            serde_json::from_str(r#"{"log_level":"info"}"#).unwrap();
        assert_eq!(config.service_name, "bizlens");
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }
}
