//! Read-only view over registered backends and connected players.

use std::{fs, net::SocketAddr, path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One addressable destination server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backend {
    /// Unique name the backend is registered under.
    pub name: String,
    /// Routing handle used by the host to open a connection.
    pub address: SocketAddr,
}

impl Backend {
    /// Create a backend reference.
    pub fn new(name: impl Into<String>, address: SocketAddr) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

impl PartialEq for Backend {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Backend {}

/// One connected player, identified by display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Unique display name.
    pub name: String,
}

impl PlayerRef {
    /// Create a player reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Queries the command needs from the host proxy.
///
/// Enumerations return the host's registration order.
pub trait Topology {
    /// All registered backends.
    fn backends(&self) -> Vec<Backend>;

    /// All connected players.
    fn players(&self) -> Vec<PlayerRef>;

    /// Backend registered under exactly `name`.
    fn backend(&self, name: &str) -> Option<Backend>;

    /// Connected player named exactly `name`.
    fn player(&self, name: &str) -> Option<PlayerRef>;

    /// Backend `player` is currently on; `None` while mid-transfer or once disconnected.
    fn current_backend(&self, player: &PlayerRef) -> Option<Backend>;

    /// Players currently on `backend`.
    fn players_on(&self, backend: &Backend) -> Vec<PlayerRef> {
        self.players()
            .into_iter()
            .filter(|player| self.current_backend(player).as_ref() == Some(backend))
            .collect()
    }
}

/// Serialized topology used to seed a [`MemoryTopology`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    /// Registered backends.
    #[serde(default)]
    pub backends: Vec<Backend>,
    /// Connected players.
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
    /// Player names granted the command permission by the host.
    #[serde(default)]
    pub operators: Vec<String>,
}

/// Connected player and the backend it is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    /// Display name.
    pub name: String,
    /// Current backend name, absent while mid-transfer.
    #[serde(default)]
    pub backend: Option<String>,
}

impl TopologySnapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read topology {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse topology {}", path.display()))
    }
}

/// Thread-safe in-memory topology, mutated by the host and read by the command.
#[derive(Debug, Clone, Default)]
pub struct MemoryTopology {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    backends: Vec<Backend>,
    players: Vec<(PlayerRef, Option<String>)>,
}

impl MemoryTopology {
    /// Empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from a snapshot, rejecting duplicates and dangling backend names.
    pub fn from_snapshot(snapshot: &TopologySnapshot) -> Result<Self> {
        let topology = Self::new();
        for backend in &snapshot.backends {
            if topology.backend(&backend.name).is_some() {
                bail!("backend {} registered twice", backend.name);
            }
            topology.register_backend(backend.clone());
        }
        for entry in &snapshot.players {
            if topology.player(&entry.name).is_some() {
                bail!("player {} connected twice", entry.name);
            }
            if let Some(backend) = entry.backend.as_deref() {
                if topology.backend(backend).is_none() {
                    bail!("player {} is on unknown backend {}", entry.name, backend);
                }
            }
            topology.connect_player(PlayerRef::new(&entry.name), entry.backend.as_deref());
        }
        Ok(topology)
    }

    /// Export the current state; `operators` is left empty.
    pub fn snapshot(&self) -> TopologySnapshot {
        let inner = self.inner.read();
        TopologySnapshot {
            backends: inner.backends.clone(),
            players: inner
                .players
                .iter()
                .map(|(player, backend)| PlayerEntry {
                    name: player.name.clone(),
                    backend: backend.clone(),
                })
                .collect(),
            operators: Vec::new(),
        }
    }

    /// Register a backend, replacing any existing one with the same name.
    pub fn register_backend(&self, backend: Backend) {
        let mut inner = self.inner.write();
        match inner.backends.iter().position(|existing| *existing == backend) {
            Some(index) => inner.backends[index] = backend,
            None => inner.backends.push(backend),
        }
    }

    /// Remove a backend; players on it are left without a current backend.
    pub fn unregister_backend(&self, name: &str) -> Option<Backend> {
        let mut inner = self.inner.write();
        let index = inner.backends.iter().position(|backend| backend.name == name)?;
        let removed = inner.backends.remove(index);
        for (_, current) in inner.players.iter_mut() {
            if current.as_deref() == Some(name) {
                *current = None;
            }
        }
        Some(removed)
    }

    /// Connect a player, optionally already placed on `backend`.
    ///
    /// An unknown backend name leaves the player mid-transfer.
    pub fn connect_player(&self, player: PlayerRef, backend: Option<&str>) {
        let mut inner = self.inner.write();
        let backend = backend
            .filter(|name| inner.backends.iter().any(|known| known.name == *name))
            .map(str::to_string);
        match inner.players.iter().position(|(existing, _)| *existing == player) {
            Some(index) => inner.players[index].1 = backend,
            None => inner.players.push((player, backend)),
        }
    }

    /// Drop a connected player. Returns whether it was connected.
    pub fn disconnect_player(&self, name: &str) -> bool {
        let mut inner = self.inner.write();
        let before = inner.players.len();
        inner.players.retain(|(player, _)| player.name != name);
        inner.players.len() != before
    }

    /// Record that `player` arrived on `backend`.
    ///
    /// Returns `false` when either side is gone, in which case nothing changes.
    pub fn set_current_backend(&self, player: &PlayerRef, backend: &Backend) -> bool {
        let mut inner = self.inner.write();
        if !inner.backends.contains(backend) {
            debug!("ignoring move of {} to unregistered {}", player.name, backend.name);
            return false;
        }
        match inner.players.iter_mut().find(|(existing, _)| existing == player) {
            Some((_, current)) => {
                *current = Some(backend.name.clone());
                true
            }
            None => {
                debug!("ignoring move of disconnected {}", player.name);
                false
            }
        }
    }
}

impl Topology for MemoryTopology {
    fn backends(&self) -> Vec<Backend> {
        self.inner.read().backends.clone()
    }

    fn players(&self) -> Vec<PlayerRef> {
        self.inner
            .read()
            .players
            .iter()
            .map(|(player, _)| player.clone())
            .collect()
    }

    fn backend(&self, name: &str) -> Option<Backend> {
        self.inner
            .read()
            .backends
            .iter()
            .find(|backend| backend.name == name)
            .cloned()
    }

    fn player(&self, name: &str) -> Option<PlayerRef> {
        self.inner
            .read()
            .players
            .iter()
            .find(|(player, _)| player.name == name)
            .map(|(player, _)| player.clone())
    }

    fn current_backend(&self, player: &PlayerRef) -> Option<Backend> {
        let inner = self.inner.read();
        let name = inner
            .players
            .iter()
            .find(|(existing, _)| existing == player)
            .and_then(|(_, backend)| backend.as_deref())?;
        inner.backends.iter().find(|backend| backend.name == name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::lobby_and_arena;
    use tempfile::tempdir;

    #[test]
    fn queries_follow_registration_order() {
        let topology = lobby_and_arena();
        let names: Vec<_> = topology.backends().into_iter().map(|b| b.name).collect();
        assert_eq!(names, ["lobby", "arena"]);

        let lobby = topology.backend("lobby").expect("lobby registered");
        let on_lobby: Vec<_> = topology.players_on(&lobby).into_iter().map(|p| p.name).collect();
        assert_eq!(on_lobby, ["alice", "bob"]);
        assert!(topology.backend("Lobby").is_none());
    }

    #[test]
    fn unregistering_backend_leaves_players_mid_transfer() {
        let topology = lobby_and_arena();
        let alice = PlayerRef::new("alice");
        assert!(topology.unregister_backend("lobby").is_some());
        assert_eq!(topology.current_backend(&alice), None);
        assert!(topology.player("alice").is_some());
    }

    #[test]
    fn moves_to_gone_targets_are_ignored() {
        let topology = lobby_and_arena();
        let arena = topology.backend("arena").expect("arena registered");
        assert!(topology.disconnect_player("bob"));
        assert!(!topology.set_current_backend(&PlayerRef::new("bob"), &arena));

        let alice = PlayerRef::new("alice");
        assert!(topology.set_current_backend(&alice, &arena));
        assert_eq!(topology.current_backend(&alice), Some(arena.clone()));

        topology.unregister_backend("arena");
        assert!(!topology.set_current_backend(&alice, &arena));
    }

    #[test]
    fn snapshot_file_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("topology.json");
        fs::write(
            &path,
            r#"{
                "backends": [{ "name": "lobby", "address": "127.0.0.1:25566" }],
                "players": [{ "name": "alice", "backend": "lobby" }, { "name": "carol" }],
                "operators": ["alice"]
            }"#,
        )?;

        let snapshot = TopologySnapshot::load(&path)?;
        assert_eq!(snapshot.operators, ["alice"]);
        let topology = MemoryTopology::from_snapshot(&snapshot)?;
        assert_eq!(
            topology.current_backend(&PlayerRef::new("alice")).map(|b| b.name),
            Some("lobby".to_string())
        );
        assert_eq!(topology.current_backend(&PlayerRef::new("carol")), None);
        assert_eq!(topology.snapshot().players.len(), 2);
        Ok(())
    }

    #[test]
    fn snapshot_with_dangling_backend_is_rejected() {
        let snapshot = TopologySnapshot {
            players: vec![PlayerEntry {
                name: "alice".to_string(),
                backend: Some("nowhere".to_string()),
            }],
            ..TopologySnapshot::default()
        };
        assert!(MemoryTopology::from_snapshot(&snapshot).is_err());
    }
}
