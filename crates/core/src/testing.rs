//! Recording collaborators shared by the unit tests.

use std::{net::SocketAddr, sync::Arc};

use parking_lot::Mutex;

use crate::{
    dispatch::{Dispatch, Dispatcher},
    permission::{CommandSource, PERMISSION},
    signal::TeleportSignal,
    topology::{Backend, MemoryTopology, PlayerRef},
};

/// Something observable the command did, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Message sent to the invoking source.
    Source(String),
    /// Request handed to the dispatcher.
    Dispatched(Dispatch),
}

/// Shared log written by both [`ScriptedSource`] and the dispatcher impl.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Entry>>>);

impl EventLog {
    pub fn entries(&self) -> Vec<Entry> {
        self.0.lock().clone()
    }

    pub fn source_messages(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Source(message) => Some(message),
                Entry::Dispatched(_) => None,
            })
            .collect()
    }

    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Dispatched(request) => Some(request),
                Entry::Source(_) => None,
            })
            .collect()
    }

    /// `(player, backend)` for every connect request.
    pub fn connects(&self) -> Vec<(String, String)> {
        self.dispatches()
            .into_iter()
            .filter_map(|request| match request {
                Dispatch::Connect { player, backend } => Some((player.name, backend.name)),
                _ => None,
            })
            .collect()
    }

    /// `(player, message)` for every notification.
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.dispatches()
            .into_iter()
            .filter_map(|request| match request {
                Dispatch::Notify { player, message } => Some((player.name, message)),
                _ => None,
            })
            .collect()
    }

    /// `(backend, decoded payload)` for every signal.
    pub fn signals(&self) -> Vec<(String, TeleportSignal)> {
        self.dispatches()
            .into_iter()
            .filter_map(|request| match request {
                Dispatch::Signal {
                    backend, payload, ..
                } => Some((
                    backend.name,
                    TeleportSignal::decode(payload).expect("signal payload decodes"),
                )),
                _ => None,
            })
            .collect()
    }

    fn push(&self, entry: Entry) {
        self.0.lock().push(entry);
    }
}

impl Dispatcher for EventLog {
    fn dispatch(&self, request: Dispatch) {
        self.push(Entry::Dispatched(request));
    }
}

/// Command source whose messages land in an [`EventLog`].
pub struct ScriptedSource {
    log: EventLog,
    player: Option<String>,
    permitted: bool,
}

impl ScriptedSource {
    pub fn console(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            player: None,
            permitted: true,
        }
    }

    pub fn player(log: &EventLog, name: &str) -> Self {
        Self {
            log: log.clone(),
            player: Some(name.to_string()),
            permitted: true,
        }
    }

    pub fn denied(mut self) -> Self {
        self.permitted = false;
        self
    }
}

impl CommandSource for ScriptedSource {
    fn has_permission(&self, permission: &str) -> bool {
        self.permitted && permission == PERMISSION
    }

    fn player_name(&self) -> Option<&str> {
        self.player.as_deref()
    }

    fn send_message(&self, message: &str) {
        self.log.push(Entry::Source(message.to_string()));
    }
}

pub fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Backends `lobby` and `arena`; `alice` and `bob` on `lobby`.
pub fn lobby_and_arena() -> MemoryTopology {
    let topology = MemoryTopology::new();
    topology.register_backend(Backend::new("lobby", addr(25566)));
    topology.register_backend(Backend::new("arena", addr(25567)));
    topology.connect_player(PlayerRef::new("alice"), Some("lobby"));
    topology.connect_player(PlayerRef::new("bob"), Some("lobby"));
    topology
}
