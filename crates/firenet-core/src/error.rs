//! Core error types for Firenet

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the Firenet ecosystem
#[derive(Error, Debug)]
pub enum FirenetError {
    /// Coordinator error
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// Server store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Tunnel service error
    #[error("Tunnel error: {0}")]
    Tunnel(#[from] TunnelError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the selection/connection coordinator
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// Malformed request (e.g. an empty guid)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Connect requested with nothing selected
    #[error("No server selected")]
    NoServerSelected,

    /// Connect requested while a mandatory update is pending
    #[error("A mandatory update is required before connecting")]
    UpdateRequired,

    /// Position-based selection outside the current list
    #[error("No server at position {position} (list has {len} servers)")]
    PositionOutOfRange { position: usize, len: usize },

    /// The tunnel service refused to start
    #[error("Tunnel failed to start: {reason}")]
    TunnelStartFailure {
        #[source]
        reason: TunnelError,
    },

    /// The tunnel service refused to stop
    #[error("Tunnel failed to stop: {reason}")]
    TunnelStopFailure {
        #[source]
        reason: TunnelError,
    },

    /// The server store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures reported by a tunnel service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TunnelError {
    /// The platform refused the VPN permission
    #[error("Permission denied")]
    PermissionDenied,

    /// The tunnel resources are held by someone else
    #[error("Resource busy")]
    ResourceBusy,

    /// Any other platform failure
    #[error("Platform error: {0}")]
    Platform(String),
}

/// Failures reported by a server store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be read or written
    #[error("Malformed store data: {0}")]
    Format(String),

    /// A server with this guid already exists
    #[error("Server already exists: {0}")]
    Duplicate(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_failure_messages() {
        let err = CoordinatorError::TunnelStartFailure {
            reason: TunnelError::PermissionDenied,
        };
        assert_eq!(err.to_string(), "Tunnel failed to start: Permission denied");

        let err = CoordinatorError::TunnelStopFailure {
            reason: TunnelError::Platform("core exited".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Tunnel failed to stop: Platform error: core exited"
        );
    }

    #[test]
    fn test_store_error_converts_into_coordinator_error() {
        let err: CoordinatorError = StoreError::Format("bad toml".to_string()).into();
        assert!(matches!(err, CoordinatorError::Store(StoreError::Format(_))));

        let top: FirenetError = err.into();
        assert!(top.to_string().starts_with("Coordinator error: Store error"));
    }

    #[test]
    fn test_position_out_of_range_message() {
        let err = CoordinatorError::PositionOutOfRange {
            position: 4,
            len: 3,
        };
        assert_eq!(err.to_string(), "No server at position 4 (list has 3 servers)");
    }
}
