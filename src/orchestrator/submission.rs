//! Pre- and post-submission hooks

use super::{PendingSubmission, SubmissionOrchestrator};
use crate::domain::{
    ColumnNameMap, Entry, EntryRecord, Form, SecureValueSet, SentinelToken, SubmittedFields,
};
use crate::errors::Result;
use tracing::{debug, info, warn, Instrument};

/// Swap every secure-eligible inbound value for its sentinel token.
///
/// Returns the outbound parameters and the captured values. Empty values and
/// values that already are tokens are left alone.
pub fn tokenize(form: &Form, inbound: &SubmittedFields) -> (SubmittedFields, SecureValueSet) {
    let mut outbound = inbound.clone();
    let mut values = SecureValueSet::new();

    for key in form.fields.iter().flat_map(|field| field.secure_keys()) {
        let name = key.post_name();
        let Some(raw) = inbound.get(&name) else {
            continue;
        };
        if raw.trim().is_empty() || SentinelToken::is_token(raw) {
            continue;
        }

        values.insert(key, raw.as_str());
        outbound.insert(name, SentinelToken::for_key(key).to_string());
    }

    (outbound, values)
}

impl SubmissionOrchestrator {
    /// Tokenize a submission before the host persists it.
    ///
    /// The connector is resolved first so a misconfigured form fails before
    /// any value is replaced.
    pub async fn before_submission(
        &self,
        form: &Form,
        inbound: &SubmittedFields,
    ) -> Result<SubmittedFields> {
        self.capture(form, inbound)
            .instrument(crate::submission_span!("before_submission", form.id))
            .await
    }

    async fn capture(&self, form: &Form, inbound: &SubmittedFields) -> Result<SubmittedFields> {
        if self.connector_for(form).await?.is_none() {
            return Ok(inbound.clone());
        }

        let (outbound, values) = tokenize(form, inbound);
        info!(secured_fields = values.len(), "Secured submitted values");

        let mut pending = self.pending.lock().await;
        if pending.is_some() {
            warn!("Discarding secure values of an earlier unfinished submission");
        }
        *pending = Some(PendingSubmission { form_id: form.id, values });

        Ok(outbound)
    }

    /// Hand the captured values to the connector once the entry exists.
    ///
    /// A submission with no secured values still writes an empty record so
    /// the entry stays queryable. The buffer is cleared whatever the outcome.
    pub async fn after_submission(&self, entry: &Entry, form: &Form) -> Result<()> {
        self.store(entry, form)
            .instrument(crate::submission_span!(
                "after_submission",
                form.id,
                entry_id = %entry.id
            ))
            .await
    }

    async fn store(&self, entry: &Entry, form: &Form) -> Result<()> {
        let pending = self.pending.lock().await.take();

        let Some(connector) = self.connector_for(form).await? else {
            return Ok(());
        };

        let values = match pending {
            Some(pending) if pending.form_id == form.id => pending.values,
            Some(pending) => {
                warn!(
                    pending_form_id = %pending.form_id,
                    "Captured values belong to another form; dropping them"
                );
                return Ok(());
            }
            None => {
                debug!("No captured values for this submission");
                return Ok(());
            }
        };

        let columns = ColumnNameMap::for_form(form);
        connector
            .add_record(&values, entry.id, form.id, &columns)
            .instrument(crate::connector_span!(
                connector.kind(),
                "add_record",
                entry_id = %entry.id,
                fields = values.len()
            ))
            .await?;

        self.entries.insert(entry.id, EntryRecord::from(values)).await;
        info!("Stored secure values");
        Ok(())
    }

    /// Provision backend structures when a form is created or updated
    pub async fn after_form_save(&self, form: &Form, is_new: bool) -> Result<()> {
        self.prepare(form, is_new)
            .instrument(crate::submission_span!("after_form_save", form.id, is_new = is_new))
            .await
    }

    async fn prepare(&self, form: &Form, is_new: bool) -> Result<()> {
        let Some(connector) = self.connector_for(form).await? else {
            return Ok(());
        };
        connector
            .prepare_form(form, is_new)
            .instrument(crate::connector_span!(connector.kind(), "prepare_form"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldKey;
    use serde_json::json;

    fn form() -> Form {
        serde_json::from_value(json!({
            "id": 7,
            "settings": {"enabled": "1"},
            "fields": [
                {"id": 1, "label": "Name"},
                {"id": 2, "label": "Full Name", "type": "name", "inputs": [
                    {"id": "2.3", "label": "First"},
                    {"id": "2.4", "label": "Last"},
                    {"id": "2.6", "label": "Suffix", "secure": false}
                ]},
                {"id": 3, "label": "Notes", "secure": false}
            ]
        }))
        .unwrap()
    }

    fn inbound(pairs: &[(&str, &str)]) -> SubmittedFields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_single_field_is_tokenized() {
        let (outbound, values) = tokenize(&form(), &inbound(&[("input_1", "Jane Doe")]));

        assert_eq!(outbound["input_1"], "ufh-gf-secured/1");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(&FieldKey::field(1)).unwrap().expose(), "Jane Doe");
    }

    #[test]
    fn test_composite_sub_inputs_are_tokenized_independently() {
        let (outbound, values) = tokenize(
            &form(),
            &inbound(&[("input_2_3", "Jane"), ("input_2_4", "Doe"), ("input_2_6", "Jr")]),
        );

        assert_eq!(outbound["input_2_3"], "ufh-gf-secured/2.3");
        assert_eq!(outbound["input_2_4"], "ufh-gf-secured/2.4");
        assert_eq!(outbound["input_2_6"], "Jr");
        assert_eq!(values.get(&FieldKey::sub_input(2, 3)).unwrap().expose(), "Jane");
        assert_eq!(values.get(&FieldKey::sub_input(2, 4)).unwrap().expose(), "Doe");
        assert!(!values.contains_key(&FieldKey::sub_input(2, 6)));
    }

    #[test]
    fn test_unsecured_empty_and_unknown_values_pass_through() {
        let original = inbound(&[
            ("input_1", "  "),
            ("input_3", "left alone"),
            ("input_99", "not a field"),
            ("gform_submit", "7"),
        ]);
        let (outbound, values) = tokenize(&form(), &original);

        assert_eq!(outbound, original);
        assert!(values.is_empty());
    }

    #[test]
    fn test_existing_token_is_not_captured() {
        let (outbound, values) = tokenize(&form(), &inbound(&[("input_1", "ufh-gf-secured/1")]));
        assert_eq!(outbound["input_1"], "ufh-gf-secured/1");
        assert!(values.is_empty());
    }
}
