//! Subscriber initialization: stderr logging plus optional OTLP span export.
//!
//! OpenTelemetry 0.31 API: `SpanExporter::builder()` feeds an
//! `SdkTracerProvider`, whose tracer backs a `tracing-opentelemetry` layer.

use once_cell::sync::OnceCell;
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ObservabilityConfig;
use crate::error::ObservabilityError;

// Kept for flushing on shutdown
static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Install the global subscriber.
///
/// Fails if the filter directive does not parse or a global subscriber is
/// already installed. An unreachable OTLP endpoint is not an error; export
/// is skipped and a warning is logged instead.
pub fn init(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    let env_filter = EnvFilter::try_new(config.effective_log_level())
        .map_err(|e| ObservabilityError::Config(format!("invalid log filter: {}", e)))?;

    let fmt_layer = config.enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let mut otlp_failure = None;
    let otel_layer = match &config.otlp_endpoint {
        Some(endpoint) => match build_otlp_tracer_provider(&config, endpoint) {
            Ok((tracer, provider)) => {
                global::set_tracer_provider(provider.clone());
                let _ = TRACER_PROVIDER.set(provider);
                Some(OpenTelemetryLayer::new(tracer))
            }
            Err(e) => {
                otlp_failure = Some(e);
                None
            }
        },
        None => None,
    };

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    match (&config.otlp_endpoint, otlp_failure) {
        (Some(endpoint), Some(e)) => tracing::warn!(
            endpoint = %endpoint,
            error = %e,
            "OTLP export unavailable, logging to console only"
        ),
        (Some(endpoint), None) => tracing::info!(
            service.name = %config.service_name,
            otlp.endpoint = %endpoint,
            "OTLP tracing enabled"
        ),
        (None, _) => tracing::debug!(
            service.name = %config.service_name,
            "tracing initialized (console only)"
        ),
    }

    Ok(())
}

fn build_otlp_tracer_provider(
    config: &ObservabilityConfig,
    endpoint: &str,
) -> Result<(SdkTracer, SdkTracerProvider), ObservabilityError> {
    let mut attributes = vec![KeyValue::new("service.name", config.service_name.clone())];
    if let Some(version) = &config.service_version {
        attributes.push(KeyValue::new("service.version", version.clone()));
    }
    for (key, value) in &config.resource_attributes {
        attributes.push(KeyValue::new(key.clone(), value.clone()));
    }
    let resource = Resource::builder().with_attributes(attributes).build();

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.to_string())
        .build()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource)
        .build();

    let tracer = provider.tracer(config.service_name.clone());
    Ok((tracer, provider))
}

/// Flush and stop the OTLP exporter, if one was started.
pub fn shutdown() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::debug!(error = %e, "tracer provider shutdown failed");
        }
    }
}

/// Initialize with configuration read from environment variables
pub fn init_from_env() -> Result<(), ObservabilityError> {
    init(ObservabilityConfig::from_env())
}
