//! # Configuration Management
//!
//! Two layers of configuration:
//!
//! - [`AppConfig`]: process settings (site, deletion policy, connector client
//!   tuning, logging), loaded from an optional YAML file plus `SFS__`-prefixed
//!   environment variables (`SFS__VAULT__API_URL`, `SFS__DELETION__ALLOW_UNSUPPORTED_DELETE`).
//! - [`EnvOverrides`]: environment-level replacements for per-form settings.

pub mod overrides;
pub mod settings;

pub use overrides::{EnvOverrides, OVERRIDE_PREFIX};
pub use settings::{
    AppConfig, DatabaseConfig, DeletionConfig, ObservabilityConfig, VaultConfig,
    DEFAULT_VAULT_API_URL,
};

use crate::errors::Result;
use std::path::Path;

/// Prefix of environment variables feeding [`AppConfig`]
pub const APP_ENV_PREFIX: &str = "SFS";

/// Nesting separator for [`AppConfig`] environment variables
pub const APP_ENV_SEPARATOR: &str = "__";

/// Load and validate the application configuration.
///
/// Later sources win: built-in defaults, then the YAML file (if given), then
/// environment variables.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(APP_ENV_PREFIX)
            .prefix_separator(APP_ENV_SEPARATOR)
            .separator(APP_ENV_SEPARATOR)
            .try_parsing(true),
    );

    let app_config: AppConfig = builder.build()?.try_deserialize()?;
    app_config.validate()?;

    tracing::debug!(
        site_id = %app_config.site_id,
        default_connector = %app_config.default_connector,
        allow_unsupported_delete = app_config.deletion.allow_unsupported_delete,
        "Loaded application configuration"
    );

    Ok(app_config)
}
