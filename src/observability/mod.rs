//! OpenTelemetry tracing exported to a local OTLP JSON file.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK TracerProvider
//!                                            └─ OtlpFileExporter → RotatingFile
//! ```
//!
//! Spans land in `<data_dir>/gigscout-otlp.json`, one OTLP `resourceSpans`
//! document per line. The file rotates at 10 MB keeping three numbered backups.
//!
//! The filter comes from `RUST_LOG` when set, else `Config::trace_level`, else
//! `info`.
//!
//! ```rust,no_run
//! use gigscout::observability::init_tracing;
//! use gigscout::Config;
//!
//! let _guard = init_tracing(&Config::default());
//! tracing::info!("tracing is now active");
//! ```

mod init;
mod otlp;
mod rotating;
mod tracer;

pub use init::{init_tracing, TracingGuard, TRACE_FILE_NAME};
