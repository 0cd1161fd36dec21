//! # Database Connection Pool Management
//!
//! Pool creation for the relational connector. Connection failures are
//! fatal for the request: secure values are never written anywhere else.

use super::dialect::SqlDialect;
use crate::config::DatabaseConfig;
use crate::errors::{Result, SecureStorageError};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

/// Create a pool for `url` with the configured sizing
pub async fn create_pool(url: &str, config: &DatabaseConfig) -> Result<AnyPool> {
    sqlx::any::install_default_drivers();
    let dialect = SqlDialect::from_url(url)?;

    let pool_options = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(config.idle_timeout())
        .test_before_acquire(true);

    let pool = pool_options.connect(url).await.map_err(|e| {
        tracing::error!(error = %e, url = %sanitize_url(url), "Failed to create database pool");
        SecureStorageError::connection_with_source(
            "relational",
            format!("Failed to connect to database: {}", sanitize_url(url)),
            Box::new(e),
        )
    })?;

    tracing::info!(
        database_type = %dialect,
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_ms = config.connect_timeout().as_millis(),
        idle_timeout_ms = config.idle_timeout().map(|d| d.as_millis()),
        "Database connection pool created"
    );

    Ok(pool)
}

/// Sanitize database URL for logging (remove credentials)
pub fn sanitize_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        if parsed.password().is_some() || !parsed.username().is_empty() {
            format!(
                "{}://***:***@{}{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or("unknown"),
                parsed.path()
            )
        } else {
            url.to_string()
        }
    } else {
        url.to_string()
    }
}
