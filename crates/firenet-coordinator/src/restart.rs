//! Restart token bookkeeping
//!
//! A restart is a stop, a quiet period, then a start. Only the most recently
//! issued restart may reach its start phase; issuing a new one cancels the
//! previous one. The tracker hands out the tokens and cancellation handles,
//! the coordinator runs the actual commands.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use firenet_core::ServerGuid;

/// Monotonically increasing restart identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestartToken(u64);

impl RestartToken {
    /// Raw token value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RestartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the restart task needs to run one restart
#[derive(Debug)]
pub(crate) struct RestartTicket {
    pub token: RestartToken,
    pub target: ServerGuid,
    /// Cancelled when a newer restart (or a manual toggle) supersedes this one
    pub cancel: CancellationToken,
    /// Cancelled once this restart's stop phase is over, on every path
    pub stopped: CancellationToken,
    /// Stop phase of the superseded predecessor, if it may still be running
    pub predecessor_stopped: Option<CancellationToken>,
}

/// A restart that was cancelled before its start phase
#[derive(Debug)]
pub(crate) struct Superseded {
    pub token: RestartToken,
    pub stopped: CancellationToken,
}

#[derive(Debug)]
struct PendingRestart {
    token: RestartToken,
    cancel: CancellationToken,
    stopped: CancellationToken,
}

/// Tracks the single pending restart
#[derive(Debug, Default)]
pub(crate) struct RestartTracker {
    last_issued: u64,
    pending: Option<PendingRestart>,
}

impl RestartTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new restart, cancelling the pending one.
    ///
    /// Returns the ticket for the new restart and the token it superseded.
    pub fn issue(&mut self, target: ServerGuid) -> (RestartTicket, Option<Superseded>) {
        let superseded = self.cancel_pending();

        self.last_issued += 1;
        let token = RestartToken(self.last_issued);
        let cancel = CancellationToken::new();
        let stopped = CancellationToken::new();

        self.pending = Some(PendingRestart {
            token,
            cancel: cancel.clone(),
            stopped: stopped.clone(),
        });

        let ticket = RestartTicket {
            token,
            target,
            cancel,
            stopped,
            predecessor_stopped: superseded.as_ref().map(|s| s.stopped.clone()),
        };

        (ticket, superseded)
    }

    /// Cancel the pending restart, if any
    pub fn cancel_pending(&mut self) -> Option<Superseded> {
        self.pending.take().map(|pending| {
            pending.cancel.cancel();
            Superseded {
                token: pending.token,
                stopped: pending.stopped,
            }
        })
    }

    /// Retire a restart.
    ///
    /// Returns true only when `token` is the pending restart, which is then
    /// cleared. A false return means the restart was superseded.
    pub fn complete(&mut self, token: RestartToken) -> bool {
        match &self.pending {
            Some(pending) if pending.token == token && !pending.cancel.is_cancelled() => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Token of the pending restart
    pub fn pending_token(&self) -> Option<RestartToken> {
        self.pending.as_ref().map(|p| p.token)
    }

    /// Whether a restart is pending
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let mut tracker = RestartTracker::new();

        let (first, _) = tracker.issue("a".into());
        let (second, _) = tracker.issue("b".into());

        assert_eq!(first.token.value(), 1);
        assert_eq!(second.token.value(), 2);
        assert!(second.token > first.token);
    }

    #[test]
    fn test_issue_cancels_predecessor() {
        let mut tracker = RestartTracker::new();

        let (first, superseded) = tracker.issue("a".into());
        assert!(superseded.is_none());
        assert!(first.predecessor_stopped.is_none());

        let (second, superseded) = tracker.issue("b".into());
        let superseded = superseded.unwrap();

        assert_eq!(superseded.token, first.token);
        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert_eq!(tracker.pending_token(), Some(second.token));

        // The successor waits on the predecessor's stop phase
        let wait = second.predecessor_stopped.unwrap();
        assert!(!wait.is_cancelled());
        first.stopped.cancel();
        assert!(wait.is_cancelled());
    }

    #[test]
    fn test_complete_only_current_token() {
        let mut tracker = RestartTracker::new();

        let (first, _) = tracker.issue("a".into());
        let (second, _) = tracker.issue("b".into());

        assert!(!tracker.complete(first.token));
        assert!(tracker.has_pending());

        assert!(tracker.complete(second.token));
        assert!(!tracker.has_pending());

        // Already retired
        assert!(!tracker.complete(second.token));
    }

    #[test]
    fn test_cancel_pending() {
        let mut tracker = RestartTracker::new();
        assert!(tracker.cancel_pending().is_none());

        let (ticket, _) = tracker.issue("a".into());
        let superseded = tracker.cancel_pending().unwrap();

        assert_eq!(superseded.token, ticket.token);
        assert!(ticket.cancel.is_cancelled());
        assert!(!tracker.complete(ticket.token));
        assert_eq!(tracker.pending_token(), None);
    }

    #[test]
    fn test_token_display() {
        let mut tracker = RestartTracker::new();
        let (ticket, _) = tracker.issue("a".into());
        assert_eq!(ticket.token.to_string(), "#1");
    }
}
