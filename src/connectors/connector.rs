//! Data connector trait and types
//!
//! Defines the contract every secure storage backend implements.

use super::fields::FieldDescriptor;
use crate::domain::{ColumnNameMap, EntryId, EntryRecord, Form, FormId, FormSettings, SecureValueSet};
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in connector kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Encrypted remote record store
    Vault,
    /// One SQL table per form
    Relational,
}

impl ConnectorKind {
    /// Registry identifier of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vault => "vault",
            Self::Relational => "relational",
        }
    }

    /// Identifiers stored by earlier deployments that still resolve to this kind
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Vault => &["tozny"],
            Self::Relational => &["mssql"],
        }
    }
}

impl FromStr for ConnectorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vault" | "tozny" => Ok(Self::Vault),
            "relational" | "mssql" => Ok(Self::Relational),
            _ => Err(format!("Unknown connector kind: {}", s)),
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of reading an entry's secure record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The stored field map
    Found(EntryRecord),
    /// Nothing is stored for the entry
    NotFound,
    /// The connector cannot read records back
    Unsupported,
}

impl ReadOutcome {
    /// The record, if one was found
    pub fn into_record(self) -> Option<EntryRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound | Self::Unsupported => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Result of deleting an entry's secure data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// This many backend records were removed
    Deleted(usize),
    /// Nothing was stored for the entry
    NotFound,
    /// A concurrent delete won the race; the data is gone either way
    Conflict,
    /// The connector cannot delete records
    Unsupported,
}

impl DeleteOutcome {
    /// True when no secure data remains for the entry
    pub fn is_complete(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Trait for secure storage connectors
///
/// Implementations must be Send + Sync for use in async contexts. One
/// instance serves one request: `init` binds it to the first form's settings
/// and later calls return `Ok(false)`.
#[async_trait]
pub trait DataConnector: Send + Sync + fmt::Debug {
    /// Get the connector kind
    fn kind(&self) -> ConnectorKind;

    /// Human-readable backend name for settings screens
    fn label(&self) -> &str;

    /// Bind the connector to a form's settings.
    ///
    /// Environment overrides are applied on top of `settings`. Returns
    /// `Ok(false)` if the connector was already initialised. Missing required
    /// settings are a configuration error; no backend call is made here.
    async fn init(&self, settings: &FormSettings) -> Result<bool>;

    /// Durably store `values` for `entry_id`
    ///
    /// # Arguments
    /// - `values`: the secured values of one submission
    /// - `entry_id`: id of the persisted host entry
    /// - `form_id`: the submitted form, for per-form schemas
    /// - `columns`: storage column name of every field key
    async fn add_record(
        &self,
        values: &SecureValueSet,
        entry_id: EntryId,
        form_id: FormId,
        columns: &ColumnNameMap,
    ) -> Result<()>;

    /// Fetch the stored field map of an entry
    async fn get_record(&self, entry_id: EntryId) -> Result<ReadOutcome>;

    /// Remove every secure record tied to an entry. Idempotent.
    async fn delete_record(&self, entry_id: EntryId) -> Result<DeleteOutcome>;

    /// Configuration inputs this connector needs; settings supplied through
    /// environment overrides are omitted
    fn settings_fields(&self) -> Vec<FieldDescriptor>;

    /// Called after a form definition is saved
    async fn prepare_form(&self, _form: &Form, _is_new: bool) -> Result<()> {
        Ok(())
    }
}
