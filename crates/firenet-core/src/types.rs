//! Core domain types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque identifier of a configured server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerGuid(String);

impl ServerGuid {
    /// Create a new server guid
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw guid string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the guid is empty or only whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ServerGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ServerGuid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServerGuid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A configured server as seen by the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Unique identifier
    pub guid: ServerGuid,
    /// Display name (the profile remarks)
    pub name: String,
    /// Position in the ordered list
    pub position: usize,
}

impl ServerEntry {
    /// Create a new server entry
    pub fn new(guid: impl Into<ServerGuid>, name: impl Into<String>, position: usize) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            position,
        }
    }
}

/// Ordered, immutable list of servers.
///
/// Built wholesale from whatever the store returns; a reload produces a new
/// list instead of mutating this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerList {
    entries: Vec<ServerEntry>,
}

impl ServerList {
    /// Create an empty list
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a list from store entries.
    ///
    /// Entries are ordered by their stored position (ties keep store order),
    /// duplicate guids keep their first occurrence, and positions are
    /// renumbered to the final index.
    pub fn from_entries(mut entries: Vec<ServerEntry>) -> Self {
        entries.sort_by_key(|e| e.position);

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.guid.clone()) {
                tracing::warn!("Dropping duplicate server entry {}", entry.guid);
                continue;
            }
            kept.push(entry);
        }

        for (index, entry) in kept.iter_mut().enumerate() {
            entry.position = index;
        }

        Self { entries: kept }
    }

    /// Get the entry at a position
    pub fn get(&self, position: usize) -> Option<&ServerEntry> {
        self.entries.get(position)
    }

    /// Find an entry by guid
    pub fn find(&self, guid: &ServerGuid) -> Option<&ServerEntry> {
        self.entries.iter().find(|e| &e.guid == guid)
    }

    /// Position of a guid in the list
    pub fn position_of(&self, guid: &ServerGuid) -> Option<usize> {
        self.find(guid).map(|e| e.position)
    }

    /// Whether the list contains a guid
    pub fn contains(&self, guid: &ServerGuid) -> bool {
        self.find(guid).is_some()
    }

    /// Iterate over the entries in order
    pub fn iter(&self) -> std::slice::Iter<'_, ServerEntry> {
        self.entries.iter()
    }

    /// Entries as a slice
    pub fn entries(&self) -> &[ServerEntry] {
        &self.entries
    }

    /// Number of servers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ServerList {
    type Item = &'a ServerEntry;
    type IntoIter = std::slice::Iter<'a, ServerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Tunnel connection state as reported by the tunnel service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Tunnel is down
    #[default]
    Disconnected,
    /// A start or stop request is in flight
    Transitioning,
    /// Tunnel is up
    Connected,
}

impl ConnectionState {
    /// Whether the tunnel is up
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Transitioning => write!(f, "transitioning"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}
