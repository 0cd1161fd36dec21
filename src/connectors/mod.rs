//! Pluggable secure storage connectors
//!
//! Every backend implements [`DataConnector`]. The orchestrator looks
//! connectors up by identifier in a [`ConnectorRegistry`].
//!
//! ## Built-in Connectors
//!
//! - **vault** (alias `tozny`): encrypted remote record store over HTTPS
//! - **relational** (alias `mssql`): one SQL table per form, PostgreSQL or SQLite

pub mod cache;
pub mod connector;
pub mod fields;
pub mod registry;
pub mod relational;
pub mod vault;

pub use cache::EntryCache;
pub use connector::{ConnectorKind, DataConnector, DeleteOutcome, ReadOutcome};
pub use fields::{is_valid_setting, FieldChoice, FieldDescriptor, FieldType, SettingsSection};
pub use registry::ConnectorRegistry;
pub use relational::{DatabaseCredentials, RelationalConnector, SqlDialect};
pub use vault::{HttpVaultClient, VaultApi, VaultConnector, VaultCredentials};
