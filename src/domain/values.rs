//! Secured values in flight and at rest.
//!
//! [`SecureValueSet`] is the request-scoped buffer filled during
//! pre-submission and consumed once by a connector write. [`EntryRecord`] is
//! what a connector hands back for an entry.

use super::field_key::FieldKey;
use super::secure_value::SecureValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Field key → raw value for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecureValueSet {
    values: BTreeMap<FieldKey, SecureValue>,
}

impl SecureValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a value, replacing any earlier value for the same key
    pub fn insert(&mut self, key: FieldKey, value: impl Into<SecureValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &FieldKey) -> Option<&SecureValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &FieldKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &SecureValue)> {
        self.values.iter()
    }

    /// Drop every buffered value
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Backend payload with the raw values exposed. Only connectors call this.
    pub fn to_payload(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.expose().to_string())))
            .collect()
    }
}

impl FromIterator<(FieldKey, SecureValue)> for SecureValueSet {
    fn from_iter<I: IntoIterator<Item = (FieldKey, SecureValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

/// A connector's stored field map for one entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryRecord {
    values: BTreeMap<FieldKey, SecureValue>,
}

impl EntryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, value: impl Into<SecureValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &FieldKey) -> Option<&SecureValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.values.keys()
    }

    /// Merge another record into this one; later values win
    pub fn merge(&mut self, other: EntryRecord) {
        self.values.extend(other.values);
    }

    /// Build a record from a backend JSON payload.
    ///
    /// Keys that are not field keys are skipped. Scalar non-string values are
    /// stringified; nested values are skipped.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let mut record = Self::new();
        for (raw_key, value) in payload {
            let Ok(key) = raw_key.parse::<FieldKey>() else {
                warn!(key = %raw_key, "Skipping non field key in secure record payload");
                continue;
            };
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                Value::Array(_) | Value::Object(_) => {
                    warn!(key = %raw_key, "Skipping nested value in secure record payload");
                    continue;
                }
            };
            record.insert(key, text);
        }
        record
    }

    /// Backend payload with the raw values exposed
    pub fn to_payload(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.expose().to_string())))
            .collect()
    }
}

impl From<SecureValueSet> for EntryRecord {
    fn from(set: SecureValueSet) -> Self {
        Self { values: set.values }
    }
}

impl FromIterator<(FieldKey, SecureValue)> for EntryRecord {
    fn from_iter<I: IntoIterator<Item = (FieldKey, SecureValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
