//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup record
    pub service_name: String,

    /// Log level filter directive (`info`, `sync_jobs=debug`, ...)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "sync-jobs".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SYNC_SERVICE_NAME`: Service name (default: sync-jobs)
    /// - `SYNC_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: info)
    /// - `SYNC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `SYNC_JSON_LOGS`: Enable JSON logs (default: false outside containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("SYNC_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("SYNC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("SYNC_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("SYNC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }
}
