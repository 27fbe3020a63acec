//! Tracing setup for applications embedding the engine.
//!
//! Events go to stderr, or to a daily rolling `ng.log` in the configured
//! `log_dir`. `RUST_LOG` takes precedence over the configured `log_level`.

use ng_conf::Settings;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

pub const LOG_FILE_PREFIX: &str = "ng.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("A global tracing subscriber is already installed")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber.
///
/// When logging to a file, the returned guard flushes pending events on drop
/// and must be held for as long as the application runs.
pub fn init_tracing(settings: &Settings) -> Result<Option<WorkerGuard>, LoggingError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(rust_log.as_deref(), &settings.log_level)?;

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(true));

    Registry::default()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::debug!(log_dir = ?settings.log_dir, "tracing initialized");
    Ok(guard)
}

/// A filter from `RUST_LOG` when it is set, otherwise from `fallback`.
fn env_filter(rust_log: Option<&str>, fallback: &str) -> Result<EnvFilter, LoggingError> {
    let directives = rust_log.filter(|value| !value.trim().is_empty()).unwrap_or(fallback);
    Ok(EnvFilter::try_new(directives)?)
}
