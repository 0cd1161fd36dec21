//! Request-scoped entry cache
//!
//! Bounds backend reads to one per entry per request. There is no TTL: the
//! cache lives exactly as long as the orchestrator or connector that owns it.

use crate::domain::{EntryId, EntryRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Entry id → secure record fetched (or written) during this request
#[derive(Debug, Clone, Default)]
pub struct EntryCache {
    inner: Arc<RwLock<HashMap<EntryId, EntryRecord>>>,
}

impl EntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached record
    pub async fn get(&self, entry_id: EntryId) -> Option<EntryRecord> {
        let cache = self.inner.read().await;
        let hit = cache.get(&entry_id).cloned();
        if hit.is_some() {
            debug!(entry_id = %entry_id, "Entry cache hit");
        }
        hit
    }

    /// Insert a record, replacing any earlier one
    pub async fn insert(&self, entry_id: EntryId, record: EntryRecord) {
        let mut cache = self.inner.write().await;
        debug!(entry_id = %entry_id, fields = record.len(), "Caching secure record");
        cache.insert(entry_id, record);
    }

    /// Drop a single entry
    pub async fn invalidate(&self, entry_id: EntryId) {
        let mut cache = self.inner.write().await;
        if cache.remove(&entry_id).is_some() {
            debug!(entry_id = %entry_id, "Invalidated cached secure record");
        }
    }

    /// Clear all cache entries
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn contains(&self, entry_id: EntryId) -> bool {
        self.inner.read().await.contains_key(&entry_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
