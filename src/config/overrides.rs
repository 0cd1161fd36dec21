//! Environment-level setting overrides.
//!
//! Process-wide, read-only configuration that replaces form-level settings
//! before a connector is resolved or initialised. A form setting `name` is
//! overridden by `SECURE_FORM_STORAGE_{NAME}` (upper-cased), the connector
//! identifier by `SECURE_FORM_STORAGE_CONNECTOR`.

use crate::domain::{FormSettings, SETTING_CONNECTOR};
use std::collections::BTreeMap;
use std::env;
use std::fmt;

/// Environment variable prefix for overrides
pub const OVERRIDE_PREFIX: &str = "SECURE_FORM_STORAGE_";

/// Immutable set of overriding settings
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    values: BTreeMap<String, String>,
}

impl EnvOverrides {
    /// No overrides
    pub fn none() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Collect overrides from `(VARIABLE, value)` pairs, keeping only prefixed ones
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let values = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(OVERRIDE_PREFIX)?;
                if name.is_empty() {
                    return None;
                }
                Some((name.to_ascii_lowercase(), value))
            })
            .collect();
        Self { values }
    }

    /// Build overrides from setting-name pairs (`"secure_client_id"`, value)
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self { values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Environment variable name overriding `setting`
    pub fn variable_for(setting: &str) -> String {
        format!("{}{}", OVERRIDE_PREFIX, setting.to_ascii_uppercase())
    }

    pub fn get(&self, setting: &str) -> Option<&str> {
        self.values.get(setting).map(String::as_str)
    }

    pub fn is_overridden(&self, setting: &str) -> bool {
        self.values.contains_key(setting)
    }

    /// Overriding connector identifier, if any
    pub fn connector(&self) -> Option<&str> {
        self.get(SETTING_CONNECTOR).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of overridden settings
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Copy of `settings` with every override applied
    pub fn apply(&self, settings: &FormSettings) -> FormSettings {
        let mut merged = settings.clone();
        for (name, value) in &self.values {
            merged.set(name.clone(), value.clone());
        }
        merged
    }
}

impl fmt::Debug for EnvOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvOverrides").field("settings", &self.values.keys().collect::<Vec<_>>()).finish()
    }
}
