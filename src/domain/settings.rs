//! Per-form secure storage settings.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Settings key of the enable checkbox
pub const SETTING_ENABLED: &str = "enabled";

/// Settings key of the selected connector identifier
pub const SETTING_CONNECTOR: &str = "connector";

/// Keys whose values are safe to show in debug output
const PUBLIC_SETTINGS: &[&str] = &[SETTING_ENABLED, SETTING_CONNECTOR];

/// Configuration key → string value, owned by a form definition
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormSettings {
    values: BTreeMap<String, String>,
}

impl FormSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of a setting that must be present and non-blank
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// `enabled` checkbox state; checkbox values arrive as "1"
    pub fn is_enabled(&self) -> bool {
        self.get(SETTING_ENABLED).is_some_and(|v| {
            matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        })
    }

    /// Connector identifier stored on the form
    pub fn connector(&self) -> Option<&str> {
        self.non_empty(SETTING_CONNECTOR)
    }
}

impl fmt::Debug for FormSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.values {
            if PUBLIC_SETTINGS.contains(&name.as_str()) {
                map.entry(name, value);
            } else {
                map.entry(name, &"[REDACTED]");
            }
        }
        map.finish()
    }
}

impl<'de> Deserialize<'de> for FormSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut values = BTreeMap::new();
        for (name, value) in raw {
            let text = match value {
                Value::String(s) => s,
                Value::Bool(b) => if b { "1" } else { "0" }.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null => continue,
                other => {
                    return Err(de::Error::custom(format!(
                        "setting '{}' must be a scalar, got {}",
                        name, other
                    )))
                }
            };
            values.insert(name, text);
        }
        Ok(Self { values })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enabled_flag_variants() {
        assert!(FormSettings::new().with("enabled", "1").is_enabled());
        assert!(FormSettings::new().with("enabled", "true").is_enabled());
        assert!(!FormSettings::new().with("enabled", "0").is_enabled());
        assert!(!FormSettings::new().is_enabled());
    }

    #[test]
    fn test_deserialize_scalars() {
        let settings: FormSettings = serde_json::from_value(json!({
            "enabled": true,
            "connector": "vault",
            "site": 3,
            "unused": null
        }))
        .unwrap();
        assert!(settings.is_enabled());
        assert_eq!(settings.connector(), Some("vault"));
        assert_eq!(settings.get("site"), Some("3"));
        assert!(!settings.contains("unused"));
    }

    #[test]
    fn test_deserialize_rejects_nested() {
        let result: Result<FormSettings, _> = serde_json::from_value(json!({"x": {"y": 1}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let settings = FormSettings::new()
            .with("connector", "vault")
            .with("secure_api_secret", "very-secret-value");
        let debug = format!("{:?}", settings);
        assert!(debug.contains("vault"));
        assert!(!debug.contains("very-secret-value"));
    }

    #[test]
    fn test_blank_connector_is_absent() {
        assert_eq!(FormSettings::new().with("connector", "  ").connector(), None);
    }
}
