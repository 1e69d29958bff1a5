//! bizlens observability: tracing subscriber setup and span helpers.
//!
//! Log lines go to stderr so they never interleave with streamed answers on
//! stdout. Spans can additionally be exported over OTLP when an endpoint is
//! configured.
//!
//! # Quick Start
//!
//! ```no_run
//! use bizlens_observability::{ObservabilityConfig, init};
//!
//! let config = ObservabilityConfig::new("bizlens")
//!     .with_otlp_endpoint("http://localhost:4317")
//!     .with_log_level("info");
//!
//! init(config).unwrap();
//! tracing::info!("ready");
//! bizlens_observability::shutdown();
//! ```
//!
//! # Environment Variables
//!
//! - `BIZLENS_LOG`, then `RUST_LOG` - Log level filter (default `warn`)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint; unset means console only
//! - `OTEL_SERVICE_NAME` - Service name (default `bizlens`)

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::ObservabilityConfig;
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use self::tracing::{record_duration, record_error};

#[doc(hidden)]
pub use ::tracing as __tracing;
