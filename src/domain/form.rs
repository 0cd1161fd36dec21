//! Form, field and entry shapes as handed over by the host form framework.

use super::field_key::FieldKey;
use super::id::{EntryId, FormId};
use super::settings::FormSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field types that never carry a submitted value
const DISPLAY_ONLY_TYPES: &[&str] = &["html", "section", "page", "captcha"];

/// Inbound request parameters keyed by their POST name (`input_2_3`)
pub type SubmittedFields = BTreeMap<String, String>;

fn default_true() -> bool {
    true
}

fn default_field_type() -> String {
    "text".to_string()
}

/// A form definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub settings: FormSettings,
}

impl Form {
    /// Look a field up by id
    pub fn field(&self, id: u32) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// True when secure storage is switched on for this form
    pub fn is_enabled(&self) -> bool {
        self.settings.is_enabled()
    }
}

/// One field of a form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: u32,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    /// Sub-inputs of composite fields (name, address, ...)
    #[serde(default)]
    pub inputs: Option<Vec<FieldInput>>,
    /// Whether values of this field are routed to secure storage
    #[serde(default = "default_true")]
    pub secure: bool,
}

impl Field {
    /// Key of a single-input field
    pub fn key(&self) -> FieldKey {
        FieldKey::field(self.id)
    }

    pub fn is_composite(&self) -> bool {
        self.inputs.as_ref().is_some_and(|inputs| !inputs.is_empty())
    }

    /// False for layout-only field types
    pub fn carries_value(&self) -> bool {
        !DISPLAY_ONLY_TYPES.contains(&self.field_type.as_str())
    }

    /// Sub-input by key
    pub fn input(&self, key: &FieldKey) -> Option<&FieldInput> {
        self.inputs.as_ref()?.iter().find(|input| input.id == *key)
    }

    /// Every key this field can store a value under
    pub fn storable_keys(&self) -> Vec<FieldKey> {
        if !self.carries_value() {
            return Vec::new();
        }
        match &self.inputs {
            Some(inputs) if !inputs.is_empty() => inputs.iter().map(|input| input.id).collect(),
            _ => vec![self.key()],
        }
    }

    /// Keys whose submitted values must be secured
    pub fn secure_keys(&self) -> Vec<FieldKey> {
        if !self.secure || !self.carries_value() {
            return Vec::new();
        }
        match &self.inputs {
            Some(inputs) if !inputs.is_empty() => inputs
                .iter()
                .filter(|input| input.secure && !input.hidden)
                .map(|input| input.id)
                .collect(),
            _ => vec![self.key()],
        }
    }
}

/// Sub-input of a composite field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInput {
    /// Composite key `{fieldId}.{subInputId}`
    pub id: FieldKey,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub secure: bool,
    #[serde(default, rename = "isHidden")]
    pub hidden: bool,
}

/// Lifecycle status of an entry in the host store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Active,
    Spam,
    Trash,
}

/// An entry persisted by the host form framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub form_id: FormId,
    #[serde(default)]
    pub status: EntryStatus,
    /// Locally stored values; secured inputs hold sentinel tokens
    #[serde(default)]
    pub values: BTreeMap<FieldKey, String>,
}

/// A value about to be rendered for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    /// Whole value of a single-input field
    Single(String),
    /// Per-sub-input values of a composite field
    Composite(BTreeMap<FieldKey, String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name_field() -> Field {
        serde_json::from_value(json!({
            "id": 2,
            "label": "Name",
            "type": "name",
            "inputs": [
                {"id": "2.2", "label": "Prefix", "isHidden": true},
                {"id": "2.3", "label": "First"},
                {"id": "2.4", "label": "Last"},
                {"id": "2.6", "label": "Suffix", "secure": false}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_single_field_defaults() {
        let field: Field = serde_json::from_value(json!({"id": 1, "label": "Name"})).unwrap();
        assert!(field.secure);
        assert!(!field.is_composite());
        assert_eq!(field.field_type, "text");
        assert_eq!(field.secure_keys(), vec![FieldKey::field(1)]);
    }

    #[test]
    fn test_composite_secure_keys_skip_hidden_and_unsecured() {
        let field = name_field();
        assert!(field.is_composite());
        assert_eq!(field.secure_keys(), vec![FieldKey::sub_input(2, 3), FieldKey::sub_input(2, 4)]);
        assert_eq!(field.storable_keys().len(), 4);
    }

    #[test]
    fn test_display_only_fields_carry_nothing() {
        let field: Field =
            serde_json::from_value(json!({"id": 5, "label": "Intro", "type": "html"})).unwrap();
        assert!(field.secure_keys().is_empty());
        assert!(field.storable_keys().is_empty());
    }

    #[test]
    fn test_unsecured_field() {
        let field: Field =
            serde_json::from_value(json!({"id": 3, "label": "Comments", "secure": false})).unwrap();
        assert!(field.secure_keys().is_empty());
        assert_eq!(field.storable_keys(), vec![FieldKey::field(3)]);
    }

    #[test]
    fn test_entry_values_keyed_by_field_key() {
        let entry: Entry = serde_json::from_value(json!({
            "id": 42,
            "form_id": 7,
            "values": {"1": "ufh-gf-secured/1", "2.3": "ufh-gf-secured/2.3"}
        }))
        .unwrap();
        assert_eq!(entry.status, EntryStatus::Active);
        assert_eq!(entry.values.get(&FieldKey::sub_input(2, 3)).unwrap(), "ufh-gf-secured/2.3");
    }
}
