//! Rehydration of sentinel tokens at display and edit time
//!
//! Lookups go through the request's entry cache; a backend is asked at most
//! once per entry. Failures render as an empty value and are not cached.

use super::SubmissionOrchestrator;
use crate::connectors::ReadOutcome;
use crate::domain::{DisplayValue, Entry, EntryId, EntryRecord, Field, FieldKey, Form, SentinelToken};
use tracing::{debug, warn, Instrument};

impl SubmissionOrchestrator {
    /// Replace sentinel tokens in a value about to be rendered.
    ///
    /// Single values are replaced whole; composite values only in the
    /// components that carry a token.
    pub async fn filter_display_value(
        &self,
        value: DisplayValue,
        field: &Field,
        entry: &Entry,
        form: &Form,
    ) -> DisplayValue {
        match value {
            DisplayValue::Single(raw) => {
                DisplayValue::Single(self.rehydrate(raw, field, field.key(), entry.id, form).await)
            }
            DisplayValue::Composite(parts) => {
                let mut rendered = parts.clone();
                for (key, raw) in parts {
                    rendered.insert(key, self.rehydrate(raw, field, key, entry.id, form).await);
                }
                DisplayValue::Composite(rendered)
            }
        }
    }

    /// Replace a sentinel token in the raw stored value of one field
    pub async fn filter_raw_field_value(
        &self,
        value: String,
        entry: &Entry,
        field: &Field,
        form: &Form,
    ) -> String {
        self.rehydrate(value, field, field.key(), entry.id, form).await
    }

    /// Only keys the displayed field secures are looked up; a token typed
    /// into any other field is shown as entered.
    async fn rehydrate(
        &self,
        raw: String,
        field: &Field,
        key: FieldKey,
        entry_id: EntryId,
        form: &Form,
    ) -> String {
        let Some(token) = SentinelToken::parse(&raw) else {
            return raw;
        };
        if !self.is_enabled(form) {
            return raw;
        }

        let key = token.resolve_key(key);
        if !field.secure_keys().contains(&key) {
            debug!(field_id = field.id, field_key = %key, "Token does not belong to a secured input of this field");
            return raw;
        }
        match self.secure_record(entry_id, form).await {
            Some(record) => match record.get(&key) {
                Some(value) => value.expose().to_string(),
                None => {
                    debug!(entry_id = %entry_id, field_key = %key, "No secure value for field");
                    String::new()
                }
            },
            None => String::new(),
        }
    }

    /// Secure record of an entry: request cache first, then the connector
    pub(crate) async fn secure_record(&self, entry_id: EntryId, form: &Form) -> Option<EntryRecord> {
        if let Some(record) = self.entries.get(entry_id).await {
            return Some(record);
        }

        let connector = match self.connector_for(form).await {
            Ok(Some(connector)) => connector,
            Ok(None) => return None,
            Err(e) => {
                warn!(entry_id = %entry_id, form_id = %form.id, error = %e, "Cannot resolve connector for display");
                return None;
            }
        };

        let outcome = connector
            .get_record(entry_id)
            .instrument(crate::connector_span!(connector.kind(), "get_record", entry_id = %entry_id))
            .await;

        match outcome {
            Ok(ReadOutcome::Found(record)) => {
                self.entries.insert(entry_id, record.clone()).await;
                Some(record)
            }
            Ok(ReadOutcome::NotFound) => {
                debug!(entry_id = %entry_id, "No secure record for entry");
                None
            }
            Ok(ReadOutcome::Unsupported) => {
                warn!(entry_id = %entry_id, connector = %connector.kind(), "Connector cannot read records");
                None
            }
            Err(e) => {
                warn!(entry_id = %entry_id, connector = %connector.kind(), error = %e, "Failed to read secure record");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, EnvOverrides};
    use serde_json::json;

    fn form(enabled: &str) -> Form {
        serde_json::from_value(json!({
            "id": 7,
            "settings": {"enabled": enabled, "connector": "dropbox"},
            "fields": [{"id": 1, "label": "Name"}]
        }))
        .unwrap()
    }

    fn entry() -> Entry {
        serde_json::from_value(json!({"id": 42, "form_id": 7})).unwrap()
    }

    fn orchestrator() -> SubmissionOrchestrator {
        SubmissionOrchestrator::from_config(&AppConfig::default(), EnvOverrides::none())
    }

    #[tokio::test]
    async fn test_plain_values_are_untouched() {
        let form = form("1");
        let value = orchestrator()
            .filter_display_value(DisplayValue::Single("Jane".into()), &form.fields[0], &entry(), &form)
            .await;
        assert_eq!(value, DisplayValue::Single("Jane".into()));
    }

    #[tokio::test]
    async fn test_cached_record_is_spliced_in() {
        let form = form("1");
        let orchestrator = orchestrator();
        let mut record = EntryRecord::new();
        record.insert(FieldKey::field(1), "Jane Doe");
        orchestrator.entries.insert(EntryId::new(42), record).await;

        let value = orchestrator
            .filter_raw_field_value("ufh-gf-secured/1".into(), &entry(), &form.fields[0], &form)
            .await;
        assert_eq!(value, "Jane Doe");

        let legacy = orchestrator
            .filter_raw_field_value("ufh-gf-secured".into(), &entry(), &form.fields[0], &form)
            .await;
        assert_eq!(legacy, "Jane Doe");
    }

    #[tokio::test]
    async fn test_resolution_failure_degrades_to_empty() {
        let form = form("1");
        let value = orchestrator()
            .filter_raw_field_value("ufh-gf-secured/1".into(), &entry(), &form.fields[0], &form)
            .await;
        assert_eq!(value, "");
    }

    #[tokio::test]
    async fn test_tokens_outside_secured_inputs_are_shown_as_entered() {
        let form: Form = serde_json::from_value(json!({
            "id": 7,
            "settings": {"enabled": "1", "connector": "dropbox"},
            "fields": [
                {"id": 1, "label": "Name"},
                {"id": 5, "label": "Notes", "secure": false}
            ]
        }))
        .unwrap();
        let orchestrator = orchestrator();
        let mut record = EntryRecord::new();
        record.insert(FieldKey::field(1), "Jane Doe");
        orchestrator.entries.insert(EntryId::new(42), record).await;

        let notes = orchestrator
            .filter_raw_field_value("ufh-gf-secured/1".into(), &entry(), &form.fields[1], &form)
            .await;
        assert_eq!(notes, "ufh-gf-secured/1");

        let name = orchestrator
            .filter_raw_field_value("ufh-gf-secured/1".into(), &entry(), &form.fields[0], &form)
            .await;
        assert_eq!(name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_disabled_form_shows_stored_value() {
        let form = form("0");
        let value = orchestrator()
            .filter_raw_field_value("ufh-gf-secured/1".into(), &entry(), &form.fields[0], &form)
            .await;
        assert_eq!(value, "ufh-gf-secured/1");
    }
}
