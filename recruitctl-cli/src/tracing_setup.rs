//! Tracing and OpenTelemetry setup for the recruitctl CLI
//!
//! Usage:
//!   recruitctl --debug ...                  # Debug logging to stderr
//!   recruitctl --otel ...                   # Export traces to OTLP endpoint
//!   RUST_LOG=recruitctl_core=debug recruitctl stats
//!
//! Environment variables:
//!   RUST_LOG                          # Log filter (default: info)
//!   OTEL_EXPORTER_OTLP_ENDPOINT       # OTLP endpoint (default: http://localhost:4317)
//!   OTEL_SERVICE_NAME                 # Service name (default: recruitctl)
//!
//! Logs go to stderr; stdout carries command replies only.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Debug level unless RUST_LOG is set
    pub debug: bool,
    /// Enable OpenTelemetry OTLP export
    pub otel: bool,
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    let fallback = if config.debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Console-only tracing
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Console tracing plus OTLP span export
#[cfg(feature = "telemetry")]
pub fn init_tracing_with_otel(config: &TracingConfig) -> Result<()> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());
    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "recruitctl".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .map_err(|e| anyhow!("Failed to create OTLP exporter: {}", e))?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(opentelemetry_sdk::Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer("recruitctl");
    // Provider must outlive the process or export stops
    let _ = opentelemetry::global::set_tracer_provider(provider);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(config.debug)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()
        .map_err(|err| anyhow!(err))?;

    tracing::info!(endpoint = %endpoint, service = %service_name, "OpenTelemetry tracing initialized");
    Ok(())
}

/// Flush pending spans
#[cfg(feature = "telemetry")]
pub fn shutdown_otel() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "telemetry"))]
pub fn shutdown_otel() {}

/// Pick console-only or OTLP export from `config.otel`
pub fn init(config: &TracingConfig) -> Result<()> {
    #[cfg(feature = "telemetry")]
    if config.otel {
        return init_tracing_with_otel(config);
    }

    init_tracing(config)?;

    #[cfg(not(feature = "telemetry"))]
    if config.otel {
        tracing::warn!("--otel ignored: built without the `telemetry` feature");
    }

    Ok(())
}

/// [`init`], reporting a failure on stderr instead of aborting the command.
///
/// Returns whether a subscriber was installed.
pub fn init_or_warn(config: &TracingConfig) -> bool {
    match init(config) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_reported_not_swallowed() {
        let config = TracingConfig::default();
        init_or_warn(&config);
        // A global subscriber is now set, so this one must fail
        assert!(init_tracing(&config).is_err());
        assert!(!init_or_warn(&config));
    }
}
