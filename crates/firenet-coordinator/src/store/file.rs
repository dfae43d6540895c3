//! TOML file server store
//!
//! Layout of the servers file:
//!
//! ```toml
//! selected = "de-1"
//!
//! [[servers]]
//! guid = "de-1"
//! name = "Germany 1"
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use firenet_core::config::StoreConfig;
use firenet_core::traits::ServerStore;
use firenet_core::{ServerEntry, ServerGuid, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ServersFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected: Option<ServerGuid>,
    #[serde(default)]
    servers: Vec<StoredServer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredServer {
    guid: ServerGuid,
    name: String,
}

/// Server store persisted in a TOML file.
///
/// A missing file reads as an empty store. Every write replaces the file
/// through a temporary sibling.
pub struct TomlServerStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlServerStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store from configuration
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.path.clone())
    }

    /// Path of the servers file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a server to the end of the list
    pub async fn add_server(
        &self,
        guid: ServerGuid,
        name: impl Into<String>,
    ) -> Result<ServerEntry, StoreError> {
        if guid.is_blank() {
            return Err(StoreError::Format("server guid must not be empty".to_string()));
        }

        let name = name.into();
        let mut position = 0;
        self.update(|file| {
            if file.servers.iter().any(|s| s.guid == guid) {
                return Err(StoreError::Duplicate(guid.to_string()));
            }
            position = file.servers.len();
            file.servers.push(StoredServer {
                guid: guid.clone(),
                name: name.clone(),
            });
            Ok(())
        })
        .await?;

        tracing::debug!("Added server {} to {:?}", guid, self.path);
        Ok(ServerEntry::new(guid, name, position))
    }

    async fn read(&self) -> Result<ServersFile, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| StoreError::Format(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ServersFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, file: &ServersFile) -> Result<(), StoreError> {
        let content =
            toml::to_string_pretty(file).map_err(|e| StoreError::Format(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn update<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ServersFile) -> Result<(), StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read().await?;
        apply(&mut file)?;
        self.write(&file).await
    }
}

#[async_trait]
impl ServerStore for TomlServerStore {
    async fn list_servers(&self) -> Result<Vec<ServerEntry>, StoreError> {
        let file = self.read().await?;
        Ok(file
            .servers
            .into_iter()
            .enumerate()
            .map(|(position, s)| ServerEntry::new(s.guid, s.name, position))
            .collect())
    }

    async fn selected(&self) -> Result<Option<ServerGuid>, StoreError> {
        Ok(self.read().await?.selected)
    }

    async fn set_selected(&self, guid: &ServerGuid) -> Result<(), StoreError> {
        self.update(|file| {
            file.selected = Some(guid.clone());
            Ok(())
        })
        .await
    }

    async fn remove_all_servers(&self) -> Result<(), StoreError> {
        self.update(|file| {
            file.servers.clear();
            Ok(())
        })
        .await
    }
}
