//! # Observability Infrastructure
//!
//! Structured logging through `tracing`, with an `EnvFilter` and an optional
//! JSON formatter. Events are written to stderr.

pub mod logging;

pub use logging::log_config_info;

use crate::config::ObservabilityConfig;
use crate::errors::{Result, SecureStorageError};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Build the filter: `RUST_LOG` if set, otherwise the configured level
fn build_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|e| {
        SecureStorageError::config_with_source(
            format!("Invalid log level '{}'", config.log_level),
            Box::new(e),
        )
    })
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (tests,
/// embedding hosts).
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = build_filter(config)?;

    let installed = if config.json_logging {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).json().finish(),
        )
        .is_ok()
    } else {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).finish(),
        )
        .is_ok()
    };

    if installed {
        tracing::info!(
            service_name = %config.service_name,
            log_level = %config.log_level,
            json_logging = config.json_logging,
            "Logging initialized"
        );
    }

    Ok(installed)
}
