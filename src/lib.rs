//! # Secure Form Storage
//!
//! Keeps sensitive form-submission values out of the host form framework's
//! entry store. Secured values are swapped for sentinel tokens before the
//! entry is saved, written to a pluggable connector once the entry exists,
//! and spliced back in whenever the entry is displayed.
//!
//! ## Architecture
//!
//! ```text
//! host hooks → SubmissionOrchestrator → ConnectorRegistry → DataConnector
//!                      ↓                                      ↓
//!               EntryCache (per request)          vault (HTTPS) / relational (SQL)
//! ```
//!
//! ## Core Components
//!
//! - **domain**: forms, entries, field keys, sentinel tokens, secure values
//! - **connectors**: the connector contract and the built-in backends
//! - **orchestrator**: the form lifecycle hooks
//! - **config**: process configuration and environment-level overrides
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use secure_form_storage::{AppConfig, EnvOverrides, SubmissionOrchestrator};
//!
//! # async fn run(form: secure_form_storage::domain::Form) -> secure_form_storage::Result<()> {
//! let orchestrator = SubmissionOrchestrator::from_config(&AppConfig::default(), EnvOverrides::from_env());
//! let inbound = [("input_1".to_string(), "Jane Doe".to_string())].into_iter().collect();
//! let outbound = orchestrator.before_submission(&form, &inbound).await?;
//! assert_eq!(outbound["input_1"], "ufh-gf-secured/1");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod connectors;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod orchestrator;

// Re-export commonly used types and traits
pub use config::{load_config, AppConfig, EnvOverrides};
pub use connectors::{ConnectorRegistry, DataConnector, DeleteOutcome, ReadOutcome};
pub use errors::{Result, SecureStorageError};
pub use orchestrator::{OrchestratorPolicy, SubmissionOrchestrator};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "secure-form-storage");
    }
}
