//! Tunnel service trait

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::TunnelError;
use crate::types::{ConnectionState, ServerGuid};

/// Abstraction over the platform tunnel (the proxy core behind the VPN)
///
/// `start` and `stop` return once the command has been accepted; completion
/// is reported through the state channel returned by `subscribe`.
#[async_trait]
pub trait TunnelService: Send + Sync {
    /// Bring the tunnel up for a server
    async fn start(&self, server: &ServerGuid) -> Result<(), TunnelError>;

    /// Bring the tunnel down
    async fn stop(&self) -> Result<(), TunnelError>;

    /// Observe connection state changes
    fn subscribe(&self) -> watch::Receiver<ConnectionState>;
}
