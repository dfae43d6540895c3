//! In-memory server store

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use firenet_core::traits::ServerStore;
use firenet_core::{ServerEntry, ServerGuid, StoreError};

/// Server store that lives only in process memory.
///
/// Counts selection writes so callers can verify that no-op selections
/// never reach the store.
#[derive(Debug, Default)]
pub struct MemoryServerStore {
    servers: RwLock<Vec<ServerEntry>>,
    selected: RwLock<Option<ServerGuid>>,
    selection_writes: AtomicUsize,
}

impl MemoryServerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given servers
    pub fn with_servers(servers: Vec<ServerEntry>) -> Self {
        Self {
            servers: RwLock::new(servers),
            ..Self::default()
        }
    }

    /// Start with a selection already persisted (not counted as a write)
    pub fn with_selected(mut self, guid: impl Into<ServerGuid>) -> Self {
        self.selected = RwLock::new(Some(guid.into()));
        self
    }

    /// Replace the stored servers, as an import or subscription update would
    pub async fn replace_servers(&self, servers: Vec<ServerEntry>) {
        *self.servers.write().await = servers;
    }

    /// Number of `set_selected` calls so far
    pub fn selection_writes(&self) -> usize {
        self.selection_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServerStore for MemoryServerStore {
    async fn list_servers(&self) -> Result<Vec<ServerEntry>, StoreError> {
        Ok(self.servers.read().await.clone())
    }

    async fn selected(&self) -> Result<Option<ServerGuid>, StoreError> {
        Ok(self.selected.read().await.clone())
    }

    async fn set_selected(&self, guid: &ServerGuid) -> Result<(), StoreError> {
        *self.selected.write().await = Some(guid.clone());
        self.selection_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_all_servers(&self) -> Result<(), StoreError> {
        self.servers.write().await.clear();
        Ok(())
    }
}
