//! CLI command implementations

mod config;
mod select;
mod servers;
mod session;
mod status;

pub use config::{config_init, config_path, config_show, load_settings};
pub use select::{select_command, SelectTarget};
pub use servers::{add_command, servers_command};
pub use session::{run_session, SessionCommand, SessionParseError};
pub use status::status_command;

use std::sync::Arc;

use anyhow::{Context, Result};

use firenet_core::config::ConfigFile;
use firenet_coordinator::{LoopbackTunnel, SelectionCoordinator, TomlServerStore};

/// Coordinator wired to the file store and a loopback tunnel, with the
/// server list already loaded
pub async fn open_coordinator(
    config: &ConfigFile,
    store: Arc<TomlServerStore>,
) -> Result<(SelectionCoordinator, Arc<LoopbackTunnel>)> {
    let tunnel = Arc::new(LoopbackTunnel::from_config(&config.tunnel));
    let coordinator =
        SelectionCoordinator::new(store.clone(), tunnel.clone(), config.coordinator.clone());

    coordinator
        .reload_servers()
        .await
        .with_context(|| format!("Failed to load servers from {:?}", store.path()))?;

    Ok((coordinator, tunnel))
}
