//! Domain layer
//!
//! Pure types shared by the connectors and the submission orchestrator, with
//! no infrastructure dependencies.
//!
//! ## Module Organization
//!
//! - `id`: numeric identifiers (form, entry, site)
//! - `form`: form definitions, fields, entries and display values
//! - `field_key`: keys of single inputs and composite sub-inputs
//! - `token`: the sentinel token stored in place of a secured value
//! - `secure_value`: redacting, zeroizing value holder
//! - `values`: the per-request buffer and the connector-side record
//! - `columns`: deterministic storage column names
//! - `settings`: per-form secure storage settings

pub mod columns;
pub mod field_key;
pub mod form;
pub mod id;
pub mod secure_value;
pub mod settings;
pub mod token;
pub mod values;

pub use columns::{column_name, ColumnNameMap};
pub use field_key::{FieldKey, InvalidFieldKey};
pub use form::{DisplayValue, Entry, EntryStatus, Field, FieldInput, Form, SubmittedFields};
pub use id::{EntryId, FormId, SiteId};
pub use secure_value::SecureValue;
pub use settings::{FormSettings, SETTING_CONNECTOR, SETTING_ENABLED};
pub use token::{SentinelToken, TOKEN_PREFIX};
pub use values::{EntryRecord, SecureValueSet};
