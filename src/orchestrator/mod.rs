//! # Submission Orchestrator
//!
//! Drives the form lifecycle against the active connector:
//!
//! ```text
//! before_submission → tokens out, raw values buffered
//! after_submission  → buffered values written, buffer cleared
//! display / raw     → tokens rehydrated through the entry cache
//! delete            → connector records removed with the entry
//! ```
//!
//! One orchestrator serves one request. It owns the secure value buffer and
//! the per-request entry cache; hooks are awaited one after another.

pub mod deletion;
pub mod display;
pub mod submission;

pub use deletion::{BulkDeleteReport, EntryLookup};
pub use submission::tokenize;

use crate::config::{AppConfig, EnvOverrides};
use crate::connectors::{
    ConnectorRegistry, DataConnector, EntryCache, FieldChoice, FieldDescriptor, SettingsSection,
};
use crate::domain::{Form, FormId, FormSettings, SecureValueSet, SETTING_CONNECTOR, SETTING_ENABLED};
use crate::errors::{Result, SecureStorageError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Title of the form settings section
pub const SETTINGS_SECTION_TITLE: &str = "Secure Storage Settings";

/// Request-independent behaviour switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorPolicy {
    /// Treat a connector that cannot delete as having deleted
    pub allow_unsupported_delete: bool,
    /// Connector used when neither the form nor the environment names one
    pub default_connector: Option<String>,
}

impl From<&AppConfig> for OrchestratorPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            allow_unsupported_delete: config.deletion.allow_unsupported_delete,
            default_connector: Some(config.default_connector.clone())
                .filter(|id| !id.trim().is_empty()),
        }
    }
}

/// Values captured by `before_submission`, awaiting the entry id
#[derive(Debug)]
struct PendingSubmission {
    form_id: FormId,
    values: SecureValueSet,
}

/// Form lifecycle controller for one request
pub struct SubmissionOrchestrator {
    registry: Arc<ConnectorRegistry>,
    overrides: EnvOverrides,
    policy: OrchestratorPolicy,
    pending: Mutex<Option<PendingSubmission>>,
    entries: EntryCache,
}

impl std::fmt::Debug for SubmissionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionOrchestrator")
            .field("registry", &self.registry)
            .field("overrides", &self.overrides)
            .field("policy", &self.policy)
            .finish()
    }
}

impl SubmissionOrchestrator {
    pub fn new(
        registry: Arc<ConnectorRegistry>,
        overrides: EnvOverrides,
        policy: OrchestratorPolicy,
    ) -> Self {
        Self { registry, overrides, policy, pending: Mutex::new(None), entries: EntryCache::new() }
    }

    /// Orchestrator over the built-in connectors
    pub fn from_config(config: &AppConfig, overrides: EnvOverrides) -> Self {
        let registry = Arc::new(ConnectorRegistry::with_builtin(config, &overrides));
        Self::new(registry, overrides, OrchestratorPolicy::from(config))
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &OrchestratorPolicy {
        &self.policy
    }

    /// Form settings with environment overrides applied
    pub fn effective_settings(&self, form: &Form) -> FormSettings {
        self.overrides.apply(&form.settings)
    }

    /// True when secure storage applies to the form
    pub fn is_enabled(&self, form: &Form) -> bool {
        self.effective_settings(form).is_enabled()
    }

    /// Connector identifier in effect for a form: environment, then form, then default
    pub fn connector_id(&self, form: &Form) -> Option<String> {
        self.overrides
            .connector()
            .or_else(|| form.settings.connector())
            .map(str::to_string)
            .or_else(|| self.policy.default_connector.clone())
    }

    /// Resolve and initialise the form's connector.
    ///
    /// `Ok(None)` for forms that do not use secure storage; no connector
    /// method is called for them.
    pub async fn connector_for(&self, form: &Form) -> Result<Option<Arc<dyn DataConnector>>> {
        if !self.is_enabled(form) {
            debug!(form_id = %form.id, "Secure storage disabled for form");
            return Ok(None);
        }

        let id = self.connector_id(form).ok_or_else(|| {
            SecureStorageError::config(format!("Form {} does not select a connector", form.id))
        })?;

        let connector = self.registry.resolve(&id).ok_or_else(|| {
            SecureStorageError::config(format!("Unknown connector '{}' for form {}", id, form.id))
        })?;

        if connector.init(&form.settings).await? {
            debug!(form_id = %form.id, connector = %connector.kind(), "Connector initialized");
        }

        Ok(Some(connector))
    }

    /// The "Secure Storage Settings" section for a form's settings screen
    pub fn form_settings_sections(&self, form: &Form) -> Vec<SettingsSection> {
        let mut fields = vec![FieldDescriptor::checkbox(
            SETTING_ENABLED,
            "Enable Secure Storage",
            "Enables the secure storage back-end on this form.",
            "Enabled",
        )];

        if self.overrides.connector().is_none() {
            let choices = self
                .registry
                .labels()
                .into_iter()
                .map(|(value, label)| FieldChoice { label, value })
                .collect();
            fields.push(FieldDescriptor::select(
                SETTING_CONNECTOR,
                "Secure Storage Connector",
                "Where secured field values are stored.",
                choices,
            ));
        }

        if let Some(connector) = self.connector_id(form).and_then(|id| self.registry.resolve(&id)) {
            fields.extend(connector.settings_fields());
        }

        vec![SettingsSection { title: SETTINGS_SECTION_TITLE.to_string(), fields }]
    }
}
