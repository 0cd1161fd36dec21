//! Connector registry
//!
//! Maps connector identifiers to connector instances. Resolution is case
//! insensitive and honours the aliases declared by [`ConnectorKind::aliases`].

use super::connector::{ConnectorKind, DataConnector};
use super::relational::RelationalConnector;
use super::vault::VaultConnector;
use crate::config::{AppConfig, EnvOverrides};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of data connectors
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<String, Arc<dyn DataConnector>>,
    aliases: BTreeMap<String, String>,
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("connectors", &self.connectors.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}

fn normalise(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

impl ConnectorRegistry {
    /// Create a new registry with no connectors
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in vault and relational connectors
    pub fn with_builtin(config: &AppConfig, overrides: &EnvOverrides) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VaultConnector::new(config.vault.clone(), overrides.clone())));
        registry.register(Arc::new(RelationalConnector::new(
            config.site_id,
            config.database.clone(),
            overrides.clone(),
        )));
        registry
    }

    /// Register a connector under its kind identifier and aliases
    pub fn register(&mut self, connector: Arc<dyn DataConnector>) {
        let kind = connector.kind();
        self.register_as(kind.as_str(), connector);
        for alias in kind.aliases() {
            self.aliases.insert(normalise(alias), kind.as_str().to_string());
        }
    }

    /// Register a connector under an explicit identifier
    pub fn register_as(&mut self, id: &str, connector: Arc<dyn DataConnector>) {
        let id = normalise(id);
        info!(connector = %id, label = %connector.label(), "Registering data connector");
        self.connectors.insert(id, connector);
    }

    /// Look a connector up by identifier or alias
    pub fn resolve(&self, id: &str) -> Option<Arc<dyn DataConnector>> {
        let id = normalise(id);
        let canonical = self.aliases.get(&id).unwrap_or(&id);
        let found = self.connectors.get(canonical).cloned();
        if found.is_none() {
            debug!(connector = %id, "No data connector registered under identifier");
        }
        found
    }

    /// Canonical identifier for `id`, if registered
    pub fn canonical_id(&self, id: &str) -> Option<String> {
        let id = normalise(id);
        let canonical = self.aliases.get(&id).cloned().unwrap_or(id);
        self.connectors.contains_key(&canonical).then_some(canonical)
    }

    /// Check if a connector is registered under `id` or an alias of it
    pub fn contains(&self, id: &str) -> bool {
        self.canonical_id(id).is_some()
    }

    /// Registered identifiers with their labels
    pub fn labels(&self) -> Vec<(String, String)> {
        self.connectors.iter().map(|(id, c)| (id.clone(), c.label().to_string())).collect()
    }

    /// Registered identifiers
    pub fn ids(&self) -> Vec<String> {
        self.connectors.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    /// Kind of the connector registered under `id`
    pub fn kind_of(&self, id: &str) -> Option<ConnectorKind> {
        self.resolve(id).map(|c| c.kind())
    }
}
