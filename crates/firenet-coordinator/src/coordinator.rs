//! Selection/connection coordinator
//!
//! The `SelectionCoordinator` serializes every selection and toggle request
//! against the persisted selection and the observed tunnel state, and decides
//! when a selection change has to restart the tunnel.
//!
//! # Atomicity Model
//!
//! One async mutex guards the coordination state: the selection
//! read-modify-write, restart token issuance, and the start phase of a
//! restart all run under it. A restart task therefore cannot issue its start
//! between a newer selection's store write and the cancellation of that
//! restart.
//!
//! # Restart ordering
//!
//! A restart is stop, debounce, start. The stop is never cancelled once
//! issued. A newer restart waits for its predecessor's stop to finish before
//! issuing its own, and only the newest restart may issue a start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex, RwLock};

use firenet_core::config::CoordinatorConfig;
use firenet_core::traits::{ServerStore, TunnelService};
use firenet_core::{ConnectionState, CoordinatorError, ServerGuid, ServerList};

use crate::events::CoordinatorEvent;
use crate::outcome::{
    CoordinatorStatus, ReloadSummary, SelectionChange, SelectionResult, ToggleResult,
};
use crate::restart::{RestartTicket, RestartToken, RestartTracker};

/// Last command the coordinator sent to the tunnel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IssuedCommand {
    Start,
    Stop,
}

/// State guarded by the coordination lock
struct CoordinatorInner {
    restarts: RestartTracker,
    last_command: Option<IssuedCommand>,
}

impl CoordinatorInner {
    /// Whether a selection change has to be carried over to the tunnel
    fn follows_selection(&self, observed: ConnectionState) -> bool {
        match observed {
            ConnectionState::Connected => true,
            _ if self.restarts.has_pending() => true,
            ConnectionState::Transitioning => self.last_command == Some(IssuedCommand::Start),
            ConnectionState::Disconnected => false,
        }
    }

    /// Whether a toggle means "disconnect"
    fn toggle_stops(&self, observed: ConnectionState) -> bool {
        match observed {
            ConnectionState::Connected => true,
            ConnectionState::Transitioning => self.last_command == Some(IssuedCommand::Start),
            ConnectionState::Disconnected => false,
        }
    }
}

struct Shared {
    store: Arc<dyn ServerStore>,
    tunnel: Arc<dyn TunnelService>,
    config: CoordinatorConfig,
    servers: RwLock<Arc<ServerList>>,
    inner: Mutex<CoordinatorInner>,
    connection: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<CoordinatorEvent>,
    update_required: AtomicBool,
}

/// Coordinates server selection with the tunnel's connection state.
///
/// Cloning is cheap; clones share the same coordination state.
#[derive(Clone)]
pub struct SelectionCoordinator {
    shared: Arc<Shared>,
}

impl SelectionCoordinator {
    /// Create a coordinator over a store and a tunnel.
    ///
    /// The server list starts empty; call [`reload_servers`](Self::reload_servers)
    /// to load it.
    pub fn new(
        store: Arc<dyn ServerStore>,
        tunnel: Arc<dyn TunnelService>,
        config: CoordinatorConfig,
    ) -> Self {
        let connection = tunnel.subscribe();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            shared: Arc::new(Shared {
                store,
                tunnel,
                config,
                servers: RwLock::new(Arc::new(ServerList::empty())),
                inner: Mutex::new(CoordinatorInner {
                    restarts: RestartTracker::new(),
                    last_command: None,
                }),
                connection,
                events,
                update_required: AtomicBool::new(false),
            }),
        }
    }

    /// Select a server by guid.
    ///
    /// Selecting the current server is a no-op. Selecting a guid that is not
    /// in the current list is accepted and flagged as `unknown_server`.
    pub async fn select_server(&self, guid: &str) -> Result<SelectionResult, CoordinatorError> {
        let guid = ServerGuid::new(guid);
        if guid.is_blank() {
            return Err(CoordinatorError::InvalidInput(
                "server guid must not be empty".to_string(),
            ));
        }

        self.shared.select(guid).await
    }

    /// Select the server at a list position (e.g. where a carousel settled)
    pub async fn select_at_position(
        &self,
        position: usize,
    ) -> Result<SelectionResult, CoordinatorError> {
        let servers = self.servers().await;
        let Some(entry) = servers.get(position) else {
            return Err(CoordinatorError::PositionOutOfRange {
                position,
                len: servers.len(),
            });
        };

        self.shared.select(entry.guid.clone()).await
    }

    /// Connect or disconnect depending on the observed state.
    ///
    /// Returns once the command has been issued; the transition itself is
    /// reported on the connection state channel.
    pub async fn toggle_connection(&self) -> Result<ToggleResult, CoordinatorError> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock().await;
        let observed = *shared.connection.borrow();

        if inner.toggle_stops(observed) {
            shared.supersede_pending(&mut inner).await;

            tracing::info!("Stopping tunnel (state: {})", observed);
            inner.last_command = Some(IssuedCommand::Stop);
            shared.tunnel.stop().await.map_err(|reason| {
                tracing::warn!("Tunnel stop failed: {}", reason);
                CoordinatorError::TunnelStopFailure { reason }
            })?;

            return Ok(ToggleResult::Stopping);
        }

        if shared.update_required.load(Ordering::SeqCst) {
            tracing::info!("Connect blocked until the mandatory update is installed");
            return Err(CoordinatorError::UpdateRequired);
        }

        let Some(server) = shared.store.selected().await? else {
            tracing::info!("Connect requested with no server selected");
            return Err(CoordinatorError::NoServerSelected);
        };

        shared.supersede_pending(&mut inner).await;

        tracing::info!("Starting tunnel for server {}", server);
        inner.last_command = Some(IssuedCommand::Start);
        shared.tunnel.start(&server).await.map_err(|reason| {
            tracing::warn!("Tunnel start for {} failed: {}", server, reason);
            CoordinatorError::TunnelStartFailure { reason }
        })?;

        Ok(ToggleResult::Starting { server })
    }

    /// Replace the server list from the store.
    ///
    /// Never touches the selection; a selection that vanished from the list
    /// is reported as dangling.
    pub async fn reload_servers(&self) -> Result<ReloadSummary, CoordinatorError> {
        let shared = &self.shared;
        let _inner = shared.inner.lock().await;

        let list = Arc::new(ServerList::from_entries(shared.store.list_servers().await?));
        let selected = shared.store.selected().await?;
        let selected_position = selected.as_ref().and_then(|g| list.position_of(g));
        let dangling_selection = selected.is_some() && selected_position.is_none();

        if dangling_selection {
            if let Some(guid) = &selected {
                tracing::warn!("Selected server {} is not in the reloaded list", guid);
            }
        }

        let count = list.len();
        *shared.servers.write().await = list;

        tracing::debug!("Reloaded {} servers", count);
        shared.emit(CoordinatorEvent::ServersReloaded {
            count,
            dangling_selection,
        });

        Ok(ReloadSummary {
            count,
            selected,
            selected_position,
            dangling_selection,
        })
    }

    /// Tear the session down after the account was logged out.
    ///
    /// Cancels any pending restart, stops the tunnel unless it is already
    /// down, and clears the server list. The selection itself is kept.
    pub async fn force_logout(&self) -> Result<(), CoordinatorError> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock().await;

        shared.supersede_pending(&mut inner).await;

        let observed = *shared.connection.borrow();
        let stopped = if observed == ConnectionState::Disconnected {
            Ok(())
        } else {
            tracing::info!("Stopping tunnel for logout (state: {})", observed);
            inner.last_command = Some(IssuedCommand::Stop);
            shared.tunnel.stop().await.map_err(|reason| {
                tracing::warn!("Tunnel stop during logout failed: {}", reason);
                CoordinatorError::TunnelStopFailure { reason }
            })
        };

        shared.store.remove_all_servers().await?;
        *shared.servers.write().await = Arc::new(ServerList::empty());

        tracing::info!("Session logged out");
        shared.emit(CoordinatorEvent::LoggedOut);

        stopped
    }

    /// Block or unblock connecting while a mandatory update is pending
    pub fn set_update_required(&self, required: bool) {
        self.shared
            .update_required
            .store(required, Ordering::SeqCst);
    }

    /// Whether connecting is blocked by a mandatory update
    pub fn update_required(&self) -> bool {
        self.shared.update_required.load(Ordering::SeqCst)
    }

    /// Current server list
    pub async fn servers(&self) -> Arc<ServerList> {
        self.shared.servers().await
    }

    /// Last connection state reported by the tunnel
    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.connection.borrow()
    }

    /// Observe connection state changes
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.shared.connection.clone()
    }

    /// Observe coordinator events
    pub fn subscribe_events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.shared.events.subscribe()
    }

    /// Token of the restart waiting for its start phase, if any
    pub async fn pending_restart(&self) -> Option<RestartToken> {
        self.shared.inner.lock().await.restarts.pending_token()
    }

    /// Snapshot of selection, connection and restart state
    pub async fn status(&self) -> Result<CoordinatorStatus, CoordinatorError> {
        let shared = &self.shared;
        let inner = shared.inner.lock().await;

        let selected = shared.store.selected().await?;
        let servers = shared.servers().await;
        let selected_position = selected.as_ref().and_then(|g| servers.position_of(g));

        Ok(CoordinatorStatus {
            dangling_selection: selected.is_some() && selected_position.is_none(),
            selected,
            selected_position,
            connection: *shared.connection.borrow(),
            pending_restart: inner.restarts.pending_token(),
            server_count: servers.len(),
            update_required: shared.update_required.load(Ordering::SeqCst),
        })
    }
}

impl Shared {
    async fn servers(&self) -> Arc<ServerList> {
        Arc::clone(&*self.servers.read().await)
    }

    fn emit(&self, event: CoordinatorEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn select(self: &Arc<Self>, guid: ServerGuid) -> Result<SelectionResult, CoordinatorError> {
        let mut inner = self.inner.lock().await;

        let previous = self.store.selected().await?;
        if previous.as_ref() == Some(&guid) {
            tracing::debug!("Server {} already selected", guid);
            return Ok(SelectionResult::Unchanged { server: guid });
        }

        self.store.set_selected(&guid).await?;

        let servers = self.servers().await;
        let previous_position = previous.as_ref().and_then(|g| servers.position_of(g));
        let current_position = servers.position_of(&guid);
        let unknown_server = current_position.is_none();

        if unknown_server {
            tracing::warn!("Selected server {} is not in the current server list", guid);
        }
        tracing::info!(
            "Selected server {} (previous: {})",
            guid,
            previous.as_ref().map(ServerGuid::as_str).unwrap_or("none")
        );

        self.emit(CoordinatorEvent::SelectionChanged {
            previous: previous.clone(),
            current: guid.clone(),
        });

        let observed = *self.connection.borrow();
        let restart = if inner.follows_selection(observed) {
            Some(self.schedule_restart(&mut inner, guid.clone()))
        } else {
            None
        };

        Ok(SelectionResult::Changed(SelectionChange {
            previous,
            current: guid,
            previous_position,
            current_position,
            unknown_server,
            restart,
        }))
    }

    /// Cancel the pending restart and wait until its stop phase is over
    async fn supersede_pending(&self, inner: &mut CoordinatorInner) {
        if let Some(superseded) = inner.restarts.cancel_pending() {
            tracing::debug!("Restart {} cancelled", superseded.token);
            self.emit(CoordinatorEvent::RestartSuperseded {
                token: superseded.token,
            });
            superseded.stopped.cancelled().await;
        }
    }

    fn schedule_restart(
        self: &Arc<Self>,
        inner: &mut CoordinatorInner,
        target: ServerGuid,
    ) -> RestartToken {
        let (ticket, superseded) = inner.restarts.issue(target.clone());
        let token = ticket.token;

        if let Some(superseded) = superseded {
            tracing::debug!("Restart {} superseded by {}", superseded.token, token);
            self.emit(CoordinatorEvent::RestartSuperseded {
                token: superseded.token,
            });
        }

        inner.last_command = Some(IssuedCommand::Stop);

        tracing::info!("Scheduling tunnel restart {} for server {}", token, target);
        self.emit(CoordinatorEvent::RestartScheduled {
            token,
            server: target,
        });

        tokio::spawn(Arc::clone(self).run_restart(ticket));
        token
    }

    async fn run_restart(self: Arc<Self>, ticket: RestartTicket) {
        let RestartTicket {
            token,
            target,
            cancel,
            stopped,
            predecessor_stopped,
        } = ticket;

        // Marks the stop phase as over however this task exits
        let stop_phase = stopped.drop_guard();

        if let Some(predecessor) = predecessor_stopped {
            predecessor.cancelled().await;
        }

        if cancel.is_cancelled() {
            tracing::debug!("Restart {} superseded before stopping", token);
            return;
        }

        tracing::info!("Restart {}: stopping tunnel", token);
        let stop_result = self.tunnel.stop().await;
        drop(stop_phase);

        if let Err(reason) = stop_result {
            tracing::warn!("Restart {} failed to stop tunnel: {}", token, reason);
            let mut inner = self.inner.lock().await;
            if inner.restarts.complete(token) {
                self.emit(CoordinatorEvent::RestartFailed {
                    token,
                    reason: CoordinatorError::TunnelStopFailure { reason }.to_string(),
                });
            }
            return;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Restart {} superseded during debounce", token);
                return;
            }
            _ = tokio::time::sleep(self.config.restart_debounce) => {}
        }

        let mut inner = self.inner.lock().await;
        if !inner.restarts.complete(token) {
            tracing::debug!("Restart {} superseded before starting", token);
            return;
        }

        let server = match self.store.selected().await {
            Ok(Some(server)) => server,
            Ok(None) => {
                self.fail_restart(token, CoordinatorError::NoServerSelected);
                return;
            }
            Err(e) => {
                self.fail_restart(token, CoordinatorError::Store(e));
                return;
            }
        };

        if server != target {
            tracing::debug!(
                "Restart {} scheduled for {} starts stored selection {}",
                token,
                target,
                server
            );
        }

        tracing::info!("Restart {}: starting tunnel for server {}", token, server);
        inner.last_command = Some(IssuedCommand::Start);

        match self.tunnel.start(&server).await {
            Ok(()) => {
                self.emit(CoordinatorEvent::RestartCompleted { token, server });
            }
            Err(reason) => {
                self.fail_restart(token, CoordinatorError::TunnelStartFailure { reason });
            }
        }
    }

    fn fail_restart(&self, token: RestartToken, error: CoordinatorError) {
        tracing::warn!("Restart {} failed: {}", token, error);
        self.emit(CoordinatorEvent::RestartFailed {
            token,
            reason: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use firenet_core::{ServerEntry, TunnelError};

    use crate::store::MemoryServerStore;
    use crate::tunnel::{LoopbackTunnel, TunnelCommand};

    fn servers(guids: &[&str]) -> Vec<ServerEntry> {
        guids
            .iter()
            .enumerate()
            .map(|(i, g)| ServerEntry::new(*g, format!("Server {}", g.to_uppercase()), i))
            .collect()
    }

    async fn setup(
        guids: &[&str],
    ) -> (
        SelectionCoordinator,
        Arc<MemoryServerStore>,
        Arc<LoopbackTunnel>,
    ) {
        let store = Arc::new(MemoryServerStore::with_servers(servers(guids)));
        let tunnel = Arc::new(LoopbackTunnel::new(Duration::ZERO));
        let coordinator = SelectionCoordinator::new(
            store.clone(),
            tunnel.clone(),
            CoordinatorConfig::default(),
        );
        coordinator.reload_servers().await.unwrap();
        (coordinator, store, tunnel)
    }

    #[tokio::test]
    async fn test_select_empty_guid_is_invalid() {
        let (coordinator, store, _tunnel) = setup(&["a", "b"]).await;

        let err = coordinator.select_server("").await.unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidInput(_)));

        let err = coordinator.select_server("   ").await.unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidInput(_)));

        assert_eq!(store.selected().await.unwrap(), None);
        assert_eq!(store.selection_writes(), 0);
    }

    #[tokio::test]
    async fn test_select_while_disconnected_does_not_restart() {
        let (coordinator, store, tunnel) = setup(&["a", "b", "c"]).await;

        let result = coordinator.select_server("b").await.unwrap();
        let change = result.change().unwrap();

        assert_eq!(change.previous, None);
        assert_eq!(change.current.as_str(), "b");
        assert_eq!(change.current_position, Some(1));
        assert!(!change.unknown_server);
        assert!(change.restart.is_none());

        assert_eq!(store.selected().await.unwrap(), Some("b".into()));
        assert!(tunnel.journal().await.is_empty());
    }

    #[tokio::test]
    async fn test_reselect_is_noop() {
        let (coordinator, store, tunnel) = setup(&["a", "b"]).await;
        coordinator.select_server("a").await.unwrap();
        coordinator.toggle_connection().await.unwrap();

        for _ in 0..5 {
            let result = coordinator.select_server("a").await.unwrap();
            assert_eq!(result, SelectionResult::Unchanged { server: "a".into() });
        }

        assert_eq!(store.selection_writes(), 1);
        assert_eq!(coordinator.pending_restart().await, None);
        assert_eq!(tunnel.journal().await, vec![TunnelCommand::Start("a".into())]);
    }

    #[tokio::test]
    async fn test_unknown_server_is_flagged_but_selected() {
        let (coordinator, store, _tunnel) = setup(&["a"]).await;

        let result = coordinator.select_server("ghost").await.unwrap();
        let change = result.change().unwrap();

        assert!(change.unknown_server);
        assert_eq!(change.current_position, None);
        assert_eq!(store.selected().await.unwrap(), Some("ghost".into()));
    }

    #[tokio::test]
    async fn test_select_reports_previous_position() {
        let (coordinator, _store, _tunnel) = setup(&["a", "b", "c"]).await;
        coordinator.select_server("c").await.unwrap();

        let result = coordinator.select_server("a").await.unwrap();
        let change = result.change().unwrap();

        assert_eq!(change.previous, Some("c".into()));
        assert_eq!(change.previous_position, Some(2));
        assert_eq!(change.current_position, Some(0));
    }

    #[tokio::test]
    async fn test_select_at_position() {
        let (coordinator, store, _tunnel) = setup(&["a", "b", "c"]).await;

        let result = coordinator.select_at_position(2).await.unwrap();
        assert_eq!(result.change().unwrap().current.as_str(), "c");
        assert_eq!(store.selected().await.unwrap(), Some("c".into()));

        let err = coordinator.select_at_position(3).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::PositionOutOfRange { position: 3, len: 3 }
        ));
    }

    #[tokio::test]
    async fn test_toggle_without_selection_issues_nothing() {
        let (coordinator, _store, tunnel) = setup(&["a"]).await;

        let err = coordinator.toggle_connection().await.unwrap_err();
        assert!(matches!(err, CoordinatorError::NoServerSelected));
        assert!(tunnel.journal().await.is_empty());
        assert_eq!(coordinator.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_toggle_starts_then_stops() {
        let (coordinator, _store, tunnel) = setup(&["a", "b"]).await;
        coordinator.select_server("b").await.unwrap();

        let result = coordinator.toggle_connection().await.unwrap();
        assert_eq!(result, ToggleResult::Starting { server: "b".into() });
        assert_eq!(coordinator.connection_state(), ConnectionState::Connected);

        let result = coordinator.toggle_connection().await.unwrap();
        assert_eq!(result, ToggleResult::Stopping);
        assert_eq!(coordinator.connection_state(), ConnectionState::Disconnected);

        assert_eq!(
            tunnel.journal().await,
            vec![TunnelCommand::Start("b".into()), TunnelCommand::Stop]
        );
    }

    #[tokio::test]
    async fn test_toggle_start_failure_is_reported() {
        let (coordinator, _store, tunnel) = setup(&["a"]).await;
        coordinator.select_server("a").await.unwrap();
        tunnel.fail_next_start(TunnelError::PermissionDenied).await;

        let err = coordinator.toggle_connection().await.unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::TunnelStartFailure {
                reason: TunnelError::PermissionDenied
            }
        ));
        assert_eq!(coordinator.connection_state(), ConnectionState::Disconnected);

        // A manual retry goes through
        coordinator.toggle_connection().await.unwrap();
        assert_eq!(coordinator.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_update_gate_blocks_connect_only() {
        let (coordinator, _store, tunnel) = setup(&["a"]).await;
        coordinator.select_server("a").await.unwrap();
        coordinator.toggle_connection().await.unwrap();

        coordinator.set_update_required(true);
        assert!(coordinator.update_required());

        // Disconnecting is still allowed
        assert_eq!(
            coordinator.toggle_connection().await.unwrap(),
            ToggleResult::Stopping
        );

        let err = coordinator.toggle_connection().await.unwrap_err();
        assert!(matches!(err, CoordinatorError::UpdateRequired));
        assert_eq!(tunnel.journal().await.len(), 2);

        coordinator.set_update_required(false);
        coordinator.toggle_connection().await.unwrap();
        assert_eq!(coordinator.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_while_connected_restarts_after_debounce() {
        let (coordinator, _store, tunnel) = setup(&["a", "b"]).await;
        coordinator.select_server("a").await.unwrap();
        coordinator.toggle_connection().await.unwrap();

        let result = coordinator.select_server("b").await.unwrap();
        let token = result.change().unwrap().restart.unwrap();
        assert_eq!(coordinator.pending_restart().await, Some(token));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            tunnel.journal().await,
            vec![TunnelCommand::Start("a".into()), TunnelCommand::Stop]
        );

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            tunnel.journal().await,
            vec![
                TunnelCommand::Start("a".into()),
                TunnelCommand::Stop,
                TunnelCommand::Start("b".into()),
            ]
        );
        assert_eq!(coordinator.pending_restart().await, None);
        assert_eq!(coordinator.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_cancels_pending_restart() {
        let (coordinator, _store, tunnel) = setup(&["a", "b"]).await;
        coordinator.select_server("a").await.unwrap();
        coordinator.toggle_connection().await.unwrap();
        coordinator.select_server("b").await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        // Restart has stopped the tunnel; the user now asks to connect
        assert_eq!(coordinator.connection_state(), ConnectionState::Disconnected);
        let result = coordinator.toggle_connection().await.unwrap();
        assert_eq!(result, ToggleResult::Starting { server: "b".into() });

        tokio::time::sleep(Duration::from_secs(2)).await;
        let starts: Vec<_> = tunnel
            .journal()
            .await
            .into_iter()
            .filter(|c| matches!(c, TunnelCommand::Start(_)))
            .collect();
        assert_eq!(
            starts,
            vec![
                TunnelCommand::Start("a".into()),
                TunnelCommand::Start("b".into())
            ]
        );
        assert_eq!(coordinator.pending_restart().await, None);
    }

    #[tokio::test]
    async fn test_reload_keeps_dangling_selection() {
        let (coordinator, store, _tunnel) = setup(&["a", "b"]).await;
        coordinator.select_server("b").await.unwrap();

        store.replace_servers(servers(&["a", "c"])).await;
        let summary = coordinator.reload_servers().await.unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.selected, Some("b".into()));
        assert_eq!(summary.selected_position, None);
        assert!(summary.dangling_selection);
        assert_eq!(store.selected().await.unwrap(), Some("b".into()));
        assert_eq!(store.selection_writes(), 1);

        let status = coordinator.status().await.unwrap();
        assert!(status.dangling_selection);
        assert_eq!(status.server_count, 2);
    }

    #[tokio::test]
    async fn test_force_logout_stops_and_clears() {
        let (coordinator, store, tunnel) = setup(&["a", "b"]).await;
        coordinator.select_server("a").await.unwrap();
        coordinator.toggle_connection().await.unwrap();
        let mut events = coordinator.subscribe_events();

        coordinator.force_logout().await.unwrap();

        assert_eq!(coordinator.connection_state(), ConnectionState::Disconnected);
        assert!(coordinator.servers().await.is_empty());
        assert!(store.list_servers().await.unwrap().is_empty());
        assert_eq!(store.selected().await.unwrap(), Some("a".into()));
        assert_eq!(tunnel.journal().await.last(), Some(&TunnelCommand::Stop));
        assert_eq!(events.recv().await.unwrap(), CoordinatorEvent::LoggedOut);
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let (coordinator, _store, _tunnel) = setup(&["a", "b"]).await;
        coordinator.select_server("b").await.unwrap();
        coordinator.toggle_connection().await.unwrap();

        let status = coordinator.status().await.unwrap();
        assert_eq!(status.selected, Some("b".into()));
        assert_eq!(status.selected_position, Some(1));
        assert!(!status.dangling_selection);
        assert_eq!(status.connection, ConnectionState::Connected);
        assert_eq!(status.pending_restart, None);
        assert_eq!(status.server_count, 2);
        assert!(!status.update_required);
    }
}
