//! firenet-coordinator: Server selection and tunnel restart coordination
//!
//! The coordinator owns the rules that tie the selected server to the
//! tunnel: which server is selected, whether a selection change has to
//! restart a running tunnel, and how overlapping restarts are collapsed so
//! only the newest selection is ever started. It also ships the stores and
//! the loopback tunnel used by the CLI and the tests.

pub mod coordinator;
pub mod events;
pub mod outcome;
pub mod restart;
pub mod store;
pub mod tunnel;

pub use coordinator::SelectionCoordinator;
pub use events::CoordinatorEvent;
pub use outcome::{CoordinatorStatus, ReloadSummary, SelectionChange, SelectionResult, ToggleResult};
pub use restart::RestartToken;
pub use store::{MemoryServerStore, TomlServerStore};
pub use tunnel::{LoopbackTunnel, TunnelCommand};
