//! Tracing setup for processes embedding the status syncer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{StatusError, StatusResult};

/// Install a global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(default_filter: &str) -> StatusResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .try_init()
        .map_err(|e| StatusError::ConfigurationError(format!("tracing init failed: {e}")))
}

/// Install a global subscriber from logging configuration.
pub fn init_from_config(config: &LoggingConfig) -> StatusResult<()> {
    init_tracing(&config.level)
}
