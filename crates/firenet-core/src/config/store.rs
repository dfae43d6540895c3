//! Server store configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the file-backed server store lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the servers file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: super::default_config_dir().join("servers.toml"),
        }
    }
}
