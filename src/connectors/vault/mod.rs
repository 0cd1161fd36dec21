//! Vault connector
//!
//! Stores one encrypted record of type `form_submission` per entry, indexed
//! by the plain attribute `post_id = {entryId}`. Reads and deletes query that
//! attribute and walk every match.

pub mod client;

pub use client::{HttpVaultClient, VaultApi, VaultDeleteStatus, VaultRecord};

use super::cache::EntryCache;
use super::connector::{ConnectorKind, DataConnector, DeleteOutcome, ReadOutcome};
use super::fields::{without_overridden, FieldDescriptor};
use crate::config::{EnvOverrides, VaultConfig};
use crate::domain::{
    ColumnNameMap, EntryId, EntryRecord, FormId, FormSettings, SecureValue, SecureValueSet,
};
use crate::errors::{Result, SecureStorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Record type of every stored submission
pub const RECORD_TYPE: &str = "form_submission";

/// Plain attribute holding the entry id
pub const INDEX_ATTRIBUTE: &str = "post_id";

pub const SETTING_CLIENT_ID: &str = "secure_client_id";
pub const SETTING_API_KEY_ID: &str = "secure_api_key_id";
pub const SETTING_API_SECRET: &str = "secure_api_secret";
pub const SETTING_PUBLIC_KEY: &str = "secure_api_public_key";
pub const SETTING_PRIVATE_KEY: &str = "secure_api_private_key";

const LABEL: &str = "Innovault by Tozny";
const CREDENTIAL_TOOLTIP: &str = "Register your client at https://console.tozny.com/clients";

/// Client credentials for the vault API
#[derive(Clone)]
pub struct VaultCredentials {
    client_id: String,
    api_key_id: String,
    api_secret: SecureValue,
    public_key: String,
    private_key: SecureValue,
}

impl std::fmt::Debug for VaultCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCredentials")
            .field("client_id", &self.client_id)
            .field("api_key_id", &self.api_key_id)
            .field("api_secret", &self.api_secret)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .finish()
    }
}

impl VaultCredentials {
    /// Read the five credential settings; every one is required
    pub fn from_settings(settings: &FormSettings) -> Result<Self> {
        let missing: Vec<&str> = [
            SETTING_CLIENT_ID,
            SETTING_API_KEY_ID,
            SETTING_API_SECRET,
            SETTING_PUBLIC_KEY,
            SETTING_PRIVATE_KEY,
        ]
        .into_iter()
        .filter(|name| settings.non_empty(name).is_none())
        .collect();

        if !missing.is_empty() {
            return Err(SecureStorageError::config(format!(
                "Missing vault settings: {}",
                missing.join(", ")
            )));
        }

        let value = |name: &str| settings.non_empty(name).unwrap_or_default().to_string();

        Ok(Self {
            client_id: value(SETTING_CLIENT_ID),
            api_key_id: value(SETTING_API_KEY_ID),
            api_secret: SecureValue::new(value(SETTING_API_SECRET)),
            public_key: value(SETTING_PUBLIC_KEY),
            private_key: SecureValue::new(value(SETTING_PRIVATE_KEY)),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn api_key_id(&self) -> &str {
        &self.api_key_id
    }

    pub fn api_secret(&self) -> &SecureValue {
        &self.api_secret
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &SecureValue {
        &self.private_key
    }
}

/// Encrypted record store connector
pub struct VaultConnector {
    config: VaultConfig,
    overrides: EnvOverrides,
    credentials: OnceCell<VaultCredentials>,
    api: OnceCell<Arc<dyn VaultApi>>,
    records: EntryCache,
}

impl std::fmt::Debug for VaultConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConnector")
            .field("api_url", &self.config.api_url)
            .field("initialized", &self.credentials.initialized())
            .field("client", &self.api.get().map(|_| "[VaultApi]"))
            .finish()
    }
}

impl VaultConnector {
    /// Connector that builds an [`HttpVaultClient`] on first use
    pub fn new(config: VaultConfig, overrides: EnvOverrides) -> Self {
        Self {
            config,
            overrides,
            credentials: OnceCell::new(),
            api: OnceCell::new(),
            records: EntryCache::new(),
        }
    }

    /// Connector bound to an existing API implementation
    pub fn with_api(config: VaultConfig, overrides: EnvOverrides, api: Arc<dyn VaultApi>) -> Self {
        Self { api: OnceCell::new_with(Some(api)), ..Self::new(config, overrides) }
    }

    pub fn is_initialized(&self) -> bool {
        self.credentials.initialized()
    }

    fn credentials(&self) -> Result<&VaultCredentials> {
        self.credentials
            .get()
            .ok_or_else(|| SecureStorageError::config("Vault connector used before init"))
    }

    async fn api(&self) -> Result<Arc<dyn VaultApi>> {
        let credentials = self.credentials()?;
        let api = self
            .api
            .get_or_try_init(|| async {
                let client = HttpVaultClient::new(&self.config, credentials.clone())?;
                info!(api_url = %client.base_url(), "Initialized vault client");
                Ok::<Arc<dyn VaultApi>, SecureStorageError>(Arc::new(client))
            })
            .await?;
        Ok(Arc::clone(api))
    }

    async fn find_records(&self, entry_id: EntryId) -> Result<Vec<VaultRecord>> {
        let api = self.api().await?;
        api.query_records(INDEX_ATTRIBUTE, &entry_id.to_string()).await
    }
}

#[async_trait]
impl DataConnector for VaultConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Vault
    }

    fn label(&self) -> &str {
        LABEL
    }

    async fn init(&self, settings: &FormSettings) -> Result<bool> {
        if self.credentials.initialized() {
            return Ok(false);
        }

        let effective = self.overrides.apply(settings);
        let credentials = VaultCredentials::from_settings(&effective)?;
        let client_id = credentials.client_id.clone();

        if self.credentials.set(credentials).is_err() {
            return Ok(false);
        }

        debug!(client_id = %client_id, "Vault connector initialized");
        Ok(true)
    }

    #[instrument(skip_all, fields(connector = "vault", entry_id = %entry_id, form_id = %form_id))]
    async fn add_record(
        &self,
        values: &SecureValueSet,
        entry_id: EntryId,
        form_id: FormId,
        _columns: &ColumnNameMap,
    ) -> Result<()> {
        let api = self.api().await?;
        let plain = BTreeMap::from([(INDEX_ATTRIBUTE.to_string(), entry_id.to_string())]);
        let record_id = api.write_record(RECORD_TYPE, values.to_payload(), plain).await?;
        self.records.invalidate(entry_id).await;

        info!(record_id = %record_id, fields = values.len(), "Wrote secure record to vault");
        Ok(())
    }

    #[instrument(skip_all, fields(connector = "vault", entry_id = %entry_id))]
    async fn get_record(&self, entry_id: EntryId) -> Result<ReadOutcome> {
        if let Some(record) = self.records.get(entry_id).await {
            return Ok(ReadOutcome::Found(record));
        }

        let results = self.find_records(entry_id).await?;
        if results.is_empty() {
            debug!("No vault record for entry");
            return Ok(ReadOutcome::NotFound);
        }

        if results.len() > 1 {
            warn!(records = results.len(), "Multiple vault records for entry; merging");
        }

        let mut record = EntryRecord::new();
        for result in &results {
            record.merge(EntryRecord::from_payload(&result.data));
        }

        self.records.insert(entry_id, record.clone()).await;
        Ok(ReadOutcome::Found(record))
    }

    #[instrument(skip_all, fields(connector = "vault", entry_id = %entry_id))]
    async fn delete_record(&self, entry_id: EntryId) -> Result<DeleteOutcome> {
        self.records.invalidate(entry_id).await;

        let results = self.find_records(entry_id).await?;
        if results.is_empty() {
            debug!("No vault record to delete");
            return Ok(DeleteOutcome::NotFound);
        }

        let api = self.api().await?;
        let mut deleted = 0;
        let mut conflicts = 0;
        for result in &results {
            match api.delete_record(&result.record_id).await? {
                VaultDeleteStatus::Deleted => deleted += 1,
                VaultDeleteStatus::NotFound => {
                    debug!(record_id = %result.record_id, "Vault record already gone");
                }
                VaultDeleteStatus::Conflict => {
                    info!(record_id = %result.record_id, "Concurrent vault delete; treating as done");
                    conflicts += 1;
                }
            }
        }

        if deleted == 0 {
            return Ok(if conflicts > 0 { DeleteOutcome::Conflict } else { DeleteOutcome::NotFound });
        }

        info!(records = deleted, "Deleted secure records from vault");
        Ok(DeleteOutcome::Deleted(deleted))
    }

    fn settings_fields(&self) -> Vec<FieldDescriptor> {
        let fields = vec![
            FieldDescriptor::credential(SETTING_CLIENT_ID, "Client ID", CREDENTIAL_TOOLTIP),
            FieldDescriptor::credential(SETTING_API_KEY_ID, "API Key ID", CREDENTIAL_TOOLTIP),
            FieldDescriptor::credential(SETTING_API_SECRET, "API Secret", CREDENTIAL_TOOLTIP),
            FieldDescriptor::credential(SETTING_PUBLIC_KEY, "Public Key", CREDENTIAL_TOOLTIP),
            FieldDescriptor::credential(SETTING_PRIVATE_KEY, "Private Key", CREDENTIAL_TOOLTIP),
        ];
        without_overridden(fields, &self.overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FormSettings {
        FormSettings::new()
            .with(SETTING_CLIENT_ID, "client-0001")
            .with(SETTING_API_KEY_ID, "key-id-0001")
            .with(SETTING_API_SECRET, "api-secret-0001")
            .with(SETTING_PUBLIC_KEY, "public-key-0001")
            .with(SETTING_PRIVATE_KEY, "private-key-0001")
    }

    #[test]
    fn test_credentials_report_missing_settings() {
        let partial = FormSettings::new().with(SETTING_CLIENT_ID, "client-0001");
        let error = VaultCredentials::from_settings(&partial).unwrap_err();
        assert!(error.is_configuration());
        let message = error.to_string();
        assert!(message.contains(SETTING_API_SECRET));
        assert!(message.contains(SETTING_PRIVATE_KEY));
        assert!(!message.contains(SETTING_CLIENT_ID));
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let credentials = VaultCredentials::from_settings(&settings()).unwrap();
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("api-secret-0001"));
        assert!(!debug.contains("private-key-0001"));
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let connector = VaultConnector::new(VaultConfig::default(), EnvOverrides::none());
        assert!(connector.init(&settings()).await.unwrap());
        assert!(!connector.init(&settings()).await.unwrap());
        assert!(connector.is_initialized());
    }

    #[tokio::test]
    async fn test_init_applies_overrides() {
        let overrides = EnvOverrides::from_pairs([
            (SETTING_CLIENT_ID, "client-from-env"),
            (SETTING_PRIVATE_KEY, "private-from-env"),
        ]);
        let connector = VaultConnector::new(VaultConfig::default(), overrides);
        let settings = FormSettings::new()
            .with(SETTING_API_KEY_ID, "key-id-0001")
            .with(SETTING_API_SECRET, "api-secret-0001")
            .with(SETTING_PUBLIC_KEY, "public-key-0001");

        assert!(connector.init(&settings).await.unwrap());
        assert_eq!(connector.credentials().unwrap().client_id(), "client-from-env");
    }

    #[tokio::test]
    async fn test_init_fails_fast_without_credentials() {
        let connector = VaultConnector::new(VaultConfig::default(), EnvOverrides::none());
        let error = connector.init(&FormSettings::new()).await.unwrap_err();
        assert!(error.is_configuration());
        assert!(!connector.is_initialized());
    }

    #[tokio::test]
    async fn test_operations_require_init() {
        let connector = VaultConnector::new(VaultConfig::default(), EnvOverrides::none());
        let error = connector.get_record(EntryId::new(1)).await.unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_settings_fields_omit_overridden() {
        let connector = VaultConnector::new(VaultConfig::default(), EnvOverrides::none());
        assert_eq!(connector.settings_fields().len(), 5);

        let overrides = EnvOverrides::from_pairs([(SETTING_API_SECRET, "from-env-secret")]);
        let connector = VaultConnector::new(VaultConfig::default(), overrides);
        let names: Vec<String> = connector.settings_fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 4);
        assert!(!names.contains(&SETTING_API_SECRET.to_string()));
    }
}
