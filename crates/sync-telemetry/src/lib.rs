//! # Sync Telemetry
//!
//! Structured logging for the sync job engine, built on `tracing` and
//! `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sync_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // build and run transaction jobs
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SYNC_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `SYNC_JSON_LOGS` | `false` | JSON lines output |
//! | `SYNC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SYNC_SERVICE_NAME` | `sync-jobs` | Service name in the startup record |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
