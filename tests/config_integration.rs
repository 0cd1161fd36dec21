//! Integration tests for configuration management
//!
//! These tests validate that process configuration reads `SFS__` variables
//! and that `SECURE_FORM_STORAGE_` variables override form settings.

use secure_form_storage::config::{load_config, EnvOverrides};
use secure_form_storage::domain::FormSettings;
use secure_form_storage::{AppConfig, Result, SubmissionOrchestrator};
use std::env;
use std::sync::Mutex;

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn restore(name: &str, original: Option<String>) {
    match original {
        Some(value) => env::set_var(name, value),
        None => env::remove_var(name),
    }
}

/// Test that configuration properly reads environment variables
#[test]
fn test_config_environment_integration() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();

    let original_site = env::var("SFS__SITE_ID").ok();
    let original_delete = env::var("SFS__DELETION__ALLOW_UNSUPPORTED_DELETE").ok();

    env::set_var("SFS__SITE_ID", "3");
    env::set_var("SFS__DELETION__ALLOW_UNSUPPORTED_DELETE", "true");

    let config = load_config(None)?;
    assert_eq!(config.site_id.get(), 3);
    assert!(config.deletion.allow_unsupported_delete);

    // Invalid site id
    env::set_var("SFS__SITE_ID", "0");
    assert!(load_config(None).is_err());

    restore("SFS__SITE_ID", original_site);
    restore("SFS__DELETION__ALLOW_UNSUPPORTED_DELETE", original_delete);

    Ok(())
}

/// Test that configuration defaults work when no environment variables are set
#[test]
fn test_config_defaults_integration() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();

    let config = load_config(None)?;
    let defaults = AppConfig::default();
    assert_eq!(config.default_connector, defaults.default_connector);
    assert_eq!(config.vault.api_url, defaults.vault.api_url);

    Ok(())
}

/// Test that environment overrides replace form settings and pick the connector
#[test]
fn test_environment_overrides_win() {
    let _guard = ENV_MUTEX.lock().unwrap();

    let connector_var = EnvOverrides::variable_for("connector");
    let client_var = EnvOverrides::variable_for("secure_client_id");
    let original_connector = env::var(&connector_var).ok();
    let original_client = env::var(&client_var).ok();

    env::set_var(&connector_var, "relational");
    env::set_var(&client_var, "client-from-env");

    let overrides = EnvOverrides::from_env();
    let form_settings = FormSettings::new()
        .with("connector", "vault")
        .with("secure_client_id", "client-from-form");
    let effective = overrides.apply(&form_settings);

    assert_eq!(effective.connector(), Some("relational"));
    assert_eq!(effective.get("secure_client_id"), Some("client-from-env"));

    let orchestrator = SubmissionOrchestrator::from_config(&AppConfig::default(), overrides);
    let form = serde_json::from_value(serde_json::json!({
        "id": 7,
        "settings": {"enabled": "1", "connector": "vault"}
    }))
    .unwrap();
    assert_eq!(orchestrator.connector_id(&form).as_deref(), Some("relational"));

    restore(&connector_var, original_connector);
    restore(&client_var, original_client);
}
