//! Events published by the coordinator
//!
//! Presentation layers subscribe to these to refresh indicators and surface
//! restart failures; connection state itself travels on the tunnel's watch
//! channel.

use serde::{Deserialize, Serialize};

use firenet_core::ServerGuid;

use crate::restart::RestartToken;

/// Event pushed to coordinator subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// The selected server changed
    SelectionChanged {
        previous: Option<ServerGuid>,
        current: ServerGuid,
    },

    /// A restart was scheduled for the new selection
    RestartScheduled {
        token: RestartToken,
        server: ServerGuid,
    },

    /// A restart was cancelled before its start phase
    RestartSuperseded { token: RestartToken },

    /// A restart issued its start command
    RestartCompleted {
        token: RestartToken,
        server: ServerGuid,
    },

    /// A restart failed; nothing is retried
    RestartFailed { token: RestartToken, reason: String },

    /// The server list was replaced
    ServersReloaded {
        count: usize,
        dangling_selection: bool,
    },

    /// The session was torn down by a forced logout
    LoggedOut,
}
