//! Subscriber installation.
//!
//! JSON lines carry `timestamp`, `level`, `target`, the message and any
//! structured fields, so a log shipper can index them without parsing.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber described by `config`.
///
/// Fails if the filter directive is invalid or a subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("invalid log filter {:?}: {e}", config.log_level)))?;

    // JSON output for containers/production
    let json_layer = (config.console_output && config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    // Pretty output for development
    let fmt_layer = (config.console_output && !config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Install a test-writer subscriber once per process; later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}
