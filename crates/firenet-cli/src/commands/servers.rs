//! Server list commands

use anyhow::{Context, Result};
use serde::Serialize;

use crate::output::{format_servers, print_success};
use firenet_core::traits::ServerStore;
use firenet_core::{ServerEntry, ServerGuid, ServerList};
use firenet_coordinator::TomlServerStore;

#[derive(Serialize)]
struct ServersView<'a> {
    selected: Option<&'a ServerGuid>,
    servers: &'a [ServerEntry],
}

/// List configured servers
pub async fn servers_command(store: &TomlServerStore, json: bool) -> Result<()> {
    let entries = store
        .list_servers()
        .await
        .with_context(|| format!("Failed to read servers from {:?}", store.path()))?;
    let servers = ServerList::from_entries(entries);
    let selected = store.selected().await?;

    if json {
        let view = ServersView {
            selected: selected.as_ref(),
            servers: servers.entries(),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", format_servers(&servers, selected.as_ref()));
    }

    Ok(())
}

/// Append a server to the store
pub async fn add_command(store: &TomlServerStore, guid: &str, name: &str) -> Result<()> {
    let entry = store
        .add_server(ServerGuid::new(guid), name)
        .await
        .with_context(|| format!("Failed to add server {}", guid))?;

    print_success(&format!(
        "Added {} ({}) at position {}",
        entry.guid, entry.name, entry.position
    ));
    Ok(())
}
