//! Subscriber setup.

use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Trace file name inside the data directory.
pub const TRACE_FILE_NAME: &str = "gigscout-otlp.json";

const SERVICE_NAME: &str = "gigscout";

/// Keeps the tracer provider alive; flushes and shuts it down on drop.
#[must_use = "dropping the guard shuts tracing down"]
pub struct TracingGuard {
    provider: TracerProvider,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        let _ = self.provider.shutdown();
    }
}

impl std::fmt::Debug for TracingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracingGuard").finish_non_exhaustive()
    }
}

/// Installs the global subscriber exporting spans to the trace file.
///
/// Returns `None` when the data directory cannot be created or a global
/// subscriber is already installed. Tracing is optional, so neither case is an
/// error for the caller.
pub fn init_tracing(config: &Config) -> Option<TracingGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.trace_level.as_deref().unwrap_or("info"))
    });

    std::fs::create_dir_all(&config.data_dir).ok()?;

    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let provider = tracer::file_tracer_provider(config.data_dir.join(TRACE_FILE_NAME), resource);
    let layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .ok()?;

    Some(TracingGuard { provider })
}
