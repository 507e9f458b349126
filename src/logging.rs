//! Log subscriber construction.
//!
//! Library code only emits `tracing` events; the binary builds one subscriber
//! from the loaded configuration and installs it before doing any work.

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LogFormat, LogLevel};

/// Build the filter for the configured level.
///
/// A `RUST_LOG` value, when present and valid, wins over the configured level.
pub fn build_env_filter(level: LogLevel, rust_log: Option<&str>) -> EnvFilter {
    let base_level = level.as_filter();

    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(base_level))
    } else {
        // The HTTP stack never logs below warn, and never below the configured level.
        let http_level = match level {
            LogLevel::Error => "error",
            _ => "warn",
        };
        EnvFilter::new(format!(
            "{base_level},hyper={http_level},hyper_util={http_level},reqwest={http_level}"
        ))
    }
}

/// Build a subscriber that writes to `writer`.
pub fn build_subscriber_with_writer<W>(
    level: LogLevel,
    format: LogFormat,
    rust_log: Option<&str>,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = build_env_filter(level, rust_log);

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_target(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
    };

    Box::new(tracing_subscriber::registry().with(fmt_layer).with(filter))
}

/// Build a subscriber that writes to stdout.
pub fn build_subscriber(
    level: LogLevel,
    format: LogFormat,
    rust_log: Option<&str>,
) -> Box<dyn Subscriber + Send + Sync> {
    build_subscriber_with_writer(level, format, rust_log, std::io::stdout)
}

/// Install the stdout subscriber as the process default.
pub fn init_logging(
    level: LogLevel,
    format: LogFormat,
    rust_log: Option<&str>,
) -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(build_subscriber(level, format, rust_log))
}
