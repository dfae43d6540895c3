//! Select command implementation

use anyhow::Result;

use crate::output::{format_selection, print_success, print_warning};
use firenet_coordinator::{SelectionCoordinator, SelectionResult};

/// What to select
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTarget {
    Guid(String),
    Position(usize),
}

/// Select a server and report the outcome
pub async fn select_command(
    coordinator: &SelectionCoordinator,
    target: SelectTarget,
) -> Result<SelectionResult> {
    let result = match &target {
        SelectTarget::Guid(guid) => coordinator.select_server(guid).await?,
        SelectTarget::Position(position) => coordinator.select_at_position(*position).await?,
    };

    if let Some(change) = result.change() {
        if change.unknown_server {
            print_warning(&format!(
                "{} is not in the server list; it is selected anyway",
                change.current
            ));
        }
    }
    print_success(&format_selection(&result));

    Ok(result)
}
