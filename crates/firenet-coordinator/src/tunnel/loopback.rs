//! Simulated tunnel service
//!
//! Stands in for the platform proxy core: every command is journaled, state
//! changes are published on a watch channel after a configurable latency, and
//! single failures can be injected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use firenet_core::config::TunnelConfig;
use firenet_core::traits::TunnelService;
use firenet_core::{ConnectionState, ServerGuid, TunnelError};

/// A command received by the loopback tunnel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "server", rename_all = "snake_case")]
pub enum TunnelCommand {
    Start(ServerGuid),
    Stop,
}

/// In-process tunnel with simulated transition latency
pub struct LoopbackTunnel {
    state: Arc<watch::Sender<ConnectionState>>,
    latency: Duration,
    /// Bumped on every transition so late completions of older ones are dropped
    generation: Arc<AtomicU64>,
    journal: Mutex<Vec<TunnelCommand>>,
    start_failure: Mutex<Option<TunnelError>>,
    stop_failure: Mutex<Option<TunnelError>>,
}

impl LoopbackTunnel {
    /// Create a disconnected tunnel.
    ///
    /// With zero latency, transitions complete before `start`/`stop` return.
    pub fn new(latency: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            state: Arc::new(state),
            latency,
            generation: Arc::new(AtomicU64::new(0)),
            journal: Mutex::new(Vec::new()),
            start_failure: Mutex::new(None),
            stop_failure: Mutex::new(None),
        }
    }

    /// Create a tunnel from configuration
    pub fn from_config(config: &TunnelConfig) -> Self {
        Self::new(config.latency)
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Every command received so far, in order
    pub async fn journal(&self) -> Vec<TunnelCommand> {
        self.journal.lock().await.clone()
    }

    /// Servers passed to `start`, in order
    pub async fn started_servers(&self) -> Vec<ServerGuid> {
        self.journal
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                TunnelCommand::Start(server) => Some(server.clone()),
                TunnelCommand::Stop => None,
            })
            .collect()
    }

    /// Make the next `start` fail
    pub async fn fail_next_start(&self, error: TunnelError) {
        *self.start_failure.lock().await = Some(error);
    }

    /// Make the next `stop` fail
    pub async fn fail_next_stop(&self, error: TunnelError) {
        *self.stop_failure.lock().await = Some(error);
    }

    /// Publish a state change that did not come from a command, as when the
    /// platform tears the tunnel down on its own
    pub fn report(&self, state: ConnectionState) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(state);
    }

    fn transition(&self, target: ConnectionState) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if self.latency.is_zero() {
            self.state.send_replace(target);
            return;
        }

        self.state.send_replace(ConnectionState::Transitioning);

        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let latency = self.latency;
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            if current.load(Ordering::SeqCst) == generation {
                state.send_replace(target);
            }
        });
    }
}

#[async_trait]
impl TunnelService for LoopbackTunnel {
    async fn start(&self, server: &ServerGuid) -> Result<(), TunnelError> {
        self.journal
            .lock()
            .await
            .push(TunnelCommand::Start(server.clone()));

        if let Some(error) = self.start_failure.lock().await.take() {
            tracing::debug!("Loopback tunnel refusing start for {}: {}", server, error);
            return Err(error);
        }

        tracing::debug!("Loopback tunnel starting for {}", server);
        self.transition(ConnectionState::Connected);
        Ok(())
    }

    async fn stop(&self) -> Result<(), TunnelError> {
        self.journal.lock().await.push(TunnelCommand::Stop);

        if let Some(error) = self.stop_failure.lock().await.take() {
            tracing::debug!("Loopback tunnel refusing stop: {}", error);
            return Err(error);
        }

        if self.state() == ConnectionState::Disconnected {
            return Ok(());
        }

        tracing::debug!("Loopback tunnel stopping");
        self.transition(ConnectionState::Disconnected);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_latency_transitions_immediately() {
        let tunnel = LoopbackTunnel::new(Duration::ZERO);

        tunnel.start(&"a".into()).await.unwrap();
        assert_eq!(tunnel.state(), ConnectionState::Connected);

        tunnel.stop().await.unwrap();
        assert_eq!(tunnel.state(), ConnectionState::Disconnected);

        assert_eq!(
            tunnel.journal().await,
            vec![TunnelCommand::Start("a".into()), TunnelCommand::Stop]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_passes_through_transitioning() {
        let tunnel = LoopbackTunnel::new(Duration::from_millis(200));
        let mut rx = tunnel.subscribe();

        tunnel.start(&"a".into()).await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Transitioning);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_transition_is_dropped() {
        let tunnel = LoopbackTunnel::new(Duration::from_millis(200));

        tunnel.start(&"a".into()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tunnel.stop().await.unwrap();

        // The start would have completed here
        tokio::time::sleep(Duration::from_millis(175)).await;
        assert_eq!(tunnel.state(), ConnectionState::Transitioning);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(tunnel.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_injected_failures_are_one_shot() {
        let tunnel = LoopbackTunnel::new(Duration::ZERO);
        tunnel.fail_next_start(TunnelError::ResourceBusy).await;

        let err = tunnel.start(&"a".into()).await.unwrap_err();
        assert_eq!(err, TunnelError::ResourceBusy);
        assert_eq!(tunnel.state(), ConnectionState::Disconnected);

        tunnel.start(&"a".into()).await.unwrap();
        assert_eq!(tunnel.state(), ConnectionState::Connected);

        tunnel
            .fail_next_stop(TunnelError::Platform("core busy".to_string()))
            .await;
        assert!(tunnel.stop().await.is_err());
        assert_eq!(tunnel.state(), ConnectionState::Connected);

        assert_eq!(tunnel.started_servers().await, vec!["a".into(), "a".into()]);
    }

    #[tokio::test]
    async fn test_report_overrides_state() {
        let tunnel = LoopbackTunnel::new(Duration::ZERO);
        tunnel.start(&"a".into()).await.unwrap();

        tunnel.report(ConnectionState::Disconnected);
        assert_eq!(tunnel.state(), ConnectionState::Disconnected);
        assert_eq!(tunnel.journal().await.len(), 1);
    }
}
