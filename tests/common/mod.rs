//! Common test utilities for all integration tests.
//!
//! Provides sample forms, a recording connector double, a fixed entry lookup
//! and file-backed SQLite databases.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod recording;
pub mod test_db;

use secure_form_storage::config::EnvOverrides;
use secure_form_storage::connectors::ConnectorRegistry;
use secure_form_storage::domain::{Entry, EntryId, EntryStatus, Form, FormId};
use secure_form_storage::orchestrator::EntryLookup;
use secure_form_storage::{OrchestratorPolicy, Result, SubmissionOrchestrator};
use serde_json::json;
use std::sync::Arc;

pub use recording::{Call, RecordingConnector};
pub use test_db::TestDatabase;

/// Identifier the recording connector is registered under
pub const RECORDING_ID: &str = "recording";

/// Form 7: a single "Name" field
pub fn name_form(connector: &str) -> Form {
    serde_json::from_value(json!({
        "id": 7,
        "title": "Contact",
        "settings": {"enabled": "1", "connector": connector},
        "fields": [
            {"id": 1, "label": "Name"}
        ]
    }))
    .expect("valid form")
}

/// Form 8: a composite name field with a non-secured suffix
pub fn composite_form(connector: &str) -> Form {
    serde_json::from_value(json!({
        "id": 8,
        "title": "Registration",
        "settings": {"enabled": "1", "connector": connector},
        "fields": [
            {"id": 2, "label": "Full Name", "type": "name", "inputs": [
                {"id": "2.3", "label": "First"},
                {"id": "2.4", "label": "Last"},
                {"id": "2.6", "label": "Suffix", "secure": false}
            ]}
        ]
    }))
    .expect("valid form")
}

/// Copy of `form` with secure storage switched off
pub fn disabled(mut form: Form) -> Form {
    form.settings.set("enabled", "0");
    form
}

pub fn entry(id: i64, form: &Form) -> Entry {
    serde_json::from_value(json!({"id": id, "form_id": form.id})).expect("valid entry")
}

/// Orchestrator whose registry holds only `connector`, as `recording`
pub fn orchestrator_with(
    connector: Arc<RecordingConnector>,
    policy: OrchestratorPolicy,
) -> SubmissionOrchestrator {
    let mut registry = ConnectorRegistry::new();
    registry.register_as(RECORDING_ID, connector);
    SubmissionOrchestrator::new(Arc::new(registry), EnvOverrides::none(), policy)
}

/// Host entry store answering with a fixed list
pub struct FixedEntries(pub Vec<EntryId>);

impl FixedEntries {
    pub fn of(ids: &[i64]) -> Self {
        Self(ids.iter().copied().map(EntryId::new).collect())
    }
}

#[async_trait::async_trait]
impl EntryLookup for FixedEntries {
    async fn entry_ids(&self, _form_id: FormId, _status: Option<EntryStatus>) -> Result<Vec<EntryId>> {
        Ok(self.0.clone())
    }
}
