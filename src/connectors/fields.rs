//! Settings field descriptors
//!
//! Connectors describe their configuration inputs with [`FieldDescriptor`]s;
//! the host renders them on the form settings screen.

use crate::config::EnvOverrides;
use serde::{Deserialize, Serialize};

/// Shortest accepted credential value (exclusive)
const MIN_SETTING_LENGTH: usize = 10;

/// Input widget of a settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Checkbox,
    Select,
}

/// Feedback validator attached to a settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingValidator {
    /// [`is_valid_setting`]
    MinLength,
}

impl SettingValidator {
    pub fn check(&self, value: &str) -> bool {
        match self {
            Self::MinLength => is_valid_setting(value),
        }
    }
}

/// Option of a checkbox or select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChoice {
    pub label: String,
    pub value: String,
}

/// One configuration input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Settings key the value is stored under
    pub name: String,
    pub tooltip: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<SettingValidator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<FieldChoice>,
}

impl FieldDescriptor {
    /// Required credential text input (`medium` width, length-checked)
    pub fn credential(name: &str, label: &str, tooltip: &str) -> Self {
        Self {
            label: label.to_string(),
            field_type: FieldType::Text,
            name: name.to_string(),
            tooltip: tooltip.to_string(),
            required: true,
            class: Some("medium".to_string()),
            validator: Some(SettingValidator::MinLength),
            choices: Vec::new(),
        }
    }

    /// Checkbox input
    pub fn checkbox(name: &str, label: &str, tooltip: &str, choice_label: &str) -> Self {
        Self {
            label: label.to_string(),
            field_type: FieldType::Checkbox,
            name: name.to_string(),
            tooltip: tooltip.to_string(),
            required: false,
            class: None,
            validator: None,
            choices: vec![FieldChoice { label: choice_label.to_string(), value: "1".to_string() }],
        }
    }

    /// Select input
    pub fn select(name: &str, label: &str, tooltip: &str, choices: Vec<FieldChoice>) -> Self {
        Self {
            label: label.to_string(),
            field_type: FieldType::Select,
            name: name.to_string(),
            tooltip: tooltip.to_string(),
            required: false,
            class: None,
            validator: None,
            choices,
        }
    }

    /// Run the feedback validator; fields without one always pass
    pub fn is_valid(&self, value: &str) -> bool {
        self.validator.map_or(true, |validator| validator.check(value))
    }
}

/// Titled group of settings fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSection {
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
}

/// Feedback rule for credential fields: longer than ten characters
pub fn is_valid_setting(value: &str) -> bool {
    value.chars().count() > MIN_SETTING_LENGTH
}

/// Drop descriptors whose value is supplied by an environment override
pub fn without_overridden(
    fields: Vec<FieldDescriptor>,
    overrides: &EnvOverrides,
) -> Vec<FieldDescriptor> {
    fields.into_iter().filter(|field| !overrides.is_overridden(&field.name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_setting() {
        assert!(!is_valid_setting(""));
        assert!(!is_valid_setting("0123456789"));
        assert!(is_valid_setting("0123456789a"));
    }

    #[test]
    fn test_credential_descriptor() {
        let field = FieldDescriptor::credential("secure_client_id", "Client ID", "Register");
        assert!(field.required);
        assert_eq!(field.class.as_deref(), Some("medium"));
        assert!(!field.is_valid("short"));
        assert!(field.is_valid("a-long-enough-client-id"));
    }

    #[test]
    fn test_descriptor_serialization() {
        let field = FieldDescriptor::credential("secure_api_secret", "API Secret", "tip");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["name"], "secure_api_secret");
        assert_eq!(json["validator"], "min_length");
        assert!(json.get("choices").is_none());
    }

    #[test]
    fn test_without_overridden() {
        let fields = vec![
            FieldDescriptor::credential("secure_database_host", "Database Host", ""),
            FieldDescriptor::credential("secure_database_name", "Database Name", ""),
        ];
        let overrides = EnvOverrides::from_pairs([("secure_database_host", "db.internal")]);

        let remaining = without_overridden(fields, &overrides);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "secure_database_name");
    }
}
