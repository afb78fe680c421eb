//! Logging bootstrap.
//!
//! The library logs through the `log` facade. The binary installs a
//! `tracing` fmt subscriber and forwards `log` records into it.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Level used when neither `RUST_LOG` nor the settings name a usable one.
pub const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to set log tracer: {0}")]
    LogTracer(#[from] log::SetLoggerError),
    #[error("failed to set tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// `RUST_LOG` wins; otherwise `level` from the settings, falling back to
/// [`DEFAULT_LEVEL`] if it does not parse.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(level: &str) -> Result<(), LoggingError> {
    tracing_log::LogTracer::init()?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(level))
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
