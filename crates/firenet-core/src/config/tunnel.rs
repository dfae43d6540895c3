//! Loopback tunnel configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_millis;

/// Settings for the simulated tunnel used by the CLI session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// How long a start or stop stays in `Transitioning`, in milliseconds
    #[serde(with = "duration_millis")]
    pub latency: Duration,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(300),
        }
    }
}
