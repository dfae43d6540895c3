//! Results returned to callers of the coordinator

use serde::{Deserialize, Serialize};

use firenet_core::{ConnectionState, ServerGuid};

use crate::restart::RestartToken;

/// Outcome of a selection request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SelectionResult {
    /// The server was already selected; nothing was written
    Unchanged { server: ServerGuid },
    /// The selection was written
    Changed(SelectionChange),
}

impl SelectionResult {
    /// Whether the selection changed
    pub fn is_changed(&self) -> bool {
        matches!(self, SelectionResult::Changed(_))
    }

    /// The change details, if the selection changed
    pub fn change(&self) -> Option<&SelectionChange> {
        match self {
            SelectionResult::Changed(change) => Some(change),
            SelectionResult::Unchanged { .. } => None,
        }
    }
}

/// A written selection change.
///
/// Positions refer to the server list current at the time of the change so
/// the caller can refresh both the old and the new indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChange {
    pub previous: Option<ServerGuid>,
    pub current: ServerGuid,
    pub previous_position: Option<usize>,
    pub current_position: Option<usize>,
    /// The new guid is not in the current list (the selection still happened)
    pub unknown_server: bool,
    /// Restart scheduled because the tunnel follows the selection
    pub restart: Option<RestartToken>,
}

/// Outcome of a connection toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ToggleResult {
    /// A start was issued
    Starting { server: ServerGuid },
    /// A stop was issued
    Stopping,
}

/// Outcome of a server list reload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadSummary {
    pub count: usize,
    pub selected: Option<ServerGuid>,
    pub selected_position: Option<usize>,
    /// A server is selected but it is not in the reloaded list
    pub dangling_selection: bool,
}

/// Point-in-time view of the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorStatus {
    pub selected: Option<ServerGuid>,
    pub selected_position: Option<usize>,
    pub dangling_selection: bool,
    pub connection: ConnectionState,
    pub pending_restart: Option<RestartToken>,
    pub server_count: usize,
    pub update_required: bool,
}
