//! Server store trait

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ServerEntry, ServerGuid};

/// Persistent owner of the server list and the selected server.
///
/// Implementations may block on disk or a key-value engine; callers only
/// invoke them from runtime tasks, never from a presentation thread.
#[async_trait]
pub trait ServerStore: Send + Sync {
    /// All configured servers, in display order
    async fn list_servers(&self) -> Result<Vec<ServerEntry>, StoreError>;

    /// Currently selected server, if any
    async fn selected(&self) -> Result<Option<ServerGuid>, StoreError>;

    /// Persist a new selection
    async fn set_selected(&self, guid: &ServerGuid) -> Result<(), StoreError>;

    /// Remove every configured server (the selection is left untouched)
    async fn remove_all_servers(&self) -> Result<(), StoreError>;
}
