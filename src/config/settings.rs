//! # Configuration Settings
//!
//! Process-level configuration for secure form storage. Per-form settings
//! live on the form itself (see [`crate::domain::FormSettings`]).

use crate::domain::SiteId;
use crate::errors::{Result, SecureStorageError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Default vault API endpoint
pub const DEFAULT_VAULT_API_URL: &str = "https://api.e3db.com";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Site whose forms are served; part of relational table names
    pub site_id: SiteId,

    /// Connector used when a form does not name one
    #[validate(length(min = 1, message = "Default connector cannot be empty"))]
    pub default_connector: String,

    /// Deletion policy
    #[validate(nested)]
    pub deletion: DeletionConfig,

    /// Vault connector configuration
    #[validate(nested)]
    pub vault: VaultConfig,

    /// Relational connector pool configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site_id: SiteId::default(),
            default_connector: "vault".to_string(),
            deletion: DeletionConfig::default(),
            vault: VaultConfig::default(),
            database: DatabaseConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(SecureStorageError::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.site_id.get() < 1 {
            return Err(SecureStorageError::validation_field(
                "site_id must be a positive integer",
                "site_id",
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(SecureStorageError::validation(
                "min_connections cannot be greater than max_connections",
            ));
        }

        Ok(())
    }
}

/// What to do when a connector cannot delete secure data
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DeletionConfig {
    /// Treat an unsupported delete as success. Setting this records the
    /// operator's acknowledgment that secure data may outlive its entry.
    pub allow_unsupported_delete: bool,
}

/// Vault connector configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultConfig {
    /// Base URL of the vault API
    #[validate(url(message = "Vault API URL must be a valid URL"))]
    pub api_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_VAULT_API_URL.to_string(), timeout_seconds: 30 }
    }
}

impl VaultConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Relational connector pool configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(min = 0, max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "secure-form-storage".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}
