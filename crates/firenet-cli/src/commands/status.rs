//! Status command implementation

use anyhow::Result;

use crate::output::format_status;
use firenet_coordinator::SelectionCoordinator;

/// Execute the status command
pub async fn status_command(coordinator: &SelectionCoordinator, json: bool) -> Result<()> {
    let status = coordinator.status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", format_status(&status));
    }

    Ok(())
}
