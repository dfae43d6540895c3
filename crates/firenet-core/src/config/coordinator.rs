//! Coordinator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_millis;

/// Configuration for the selection/connection coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period between the stop and the start of a restart, in
    /// milliseconds. Gives the tunnel time to release its resources.
    #[serde(with = "duration_millis")]
    pub restart_debounce: Duration,

    /// Capacity of the coordinator event broadcast channel
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            restart_debounce: Duration::from_millis(500),
            event_capacity: 64,
        }
    }
}

impl CoordinatorConfig {
    /// Override the restart debounce
    pub fn with_restart_debounce(mut self, debounce: Duration) -> Self {
        self.restart_debounce = debounce;
        self
    }
}
