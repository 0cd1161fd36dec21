//! Column names for physical storage.
//!
//! Names are a pure function of field id, label and (for sub-inputs) sub-input
//! id and label: `{label}_{id}` or `{label}_{id}_{subLabel}_{subId}`, lower-cased
//! and reduced to `[a-z0-9_]` so they can be used as SQL identifiers.

use super::field_key::FieldKey;
use super::form::{Field, FieldInput, Form};
use serde::Serialize;
use std::collections::BTreeMap;

/// Longest label fragment kept in a column name; keeps names under the
/// 63-byte identifier limit of PostgreSQL.
const MAX_LABEL_SLUG: usize = 24;

/// Fallback fragment for empty or symbol-only labels
const EMPTY_LABEL_SLUG: &str = "field";

/// Lower-case a label and reduce it to `[a-z0-9_]`
fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let mut trimmed: String = out.trim_matches('_').chars().take(MAX_LABEL_SLUG).collect();
    while trimmed.ends_with('_') {
        trimmed.pop();
    }
    if trimmed.is_empty() {
        EMPTY_LABEL_SLUG.to_string()
    } else {
        trimmed
    }
}

/// Column name of a single-input field
pub fn field_column_name(field: &Field) -> String {
    format!("{}_{}", slug(&field.label), field.id)
}

/// Column name of a composite field's sub-input
pub fn input_column_name(field: &Field, input: &FieldInput) -> String {
    let sub_id = input.id.input_id().map(|id| id.to_string()).unwrap_or_default();
    format!("{}_{}_{}_{}", slug(&field.label), field.id, slug(&input.label), sub_id)
}

/// Column name for any key of `field`, `None` if the key is not one of its inputs
pub fn column_name(field: &Field, key: &FieldKey) -> Option<String> {
    if key.field_id() != field.id {
        return None;
    }
    match key.input_id() {
        None => Some(field_column_name(field)),
        Some(_) => field.input(key).map(|input| input_column_name(field, input)),
    }
}

/// Field key → column name for every storable input of a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnNameMap {
    columns: BTreeMap<FieldKey, String>,
}

impl ColumnNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every value-carrying field and sub-input of `form`
    pub fn for_form(form: &Form) -> Self {
        let mut columns = BTreeMap::new();
        for field in &form.fields {
            for key in field.storable_keys() {
                if let Some(name) = column_name(field, &key) {
                    columns.insert(key, name);
                }
            }
        }
        Self { columns }
    }

    pub fn insert(&mut self, key: FieldKey, column: impl Into<String>) {
        self.columns.insert(key, column.into());
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.columns.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.columns.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Column names that map to more than one key
    pub fn collisions(&self) -> Vec<&str> {
        let mut seen = BTreeMap::<&str, usize>::new();
        for column in self.columns.values() {
            *seen.entry(column.as_str()).or_default() += 1;
        }
        seen.into_iter().filter(|(_, count)| *count > 1).map(|(name, _)| name).collect()
    }
}

impl FromIterator<(FieldKey, String)> for ColumnNameMap {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        Self { columns: iter.into_iter().collect() }
    }
}
