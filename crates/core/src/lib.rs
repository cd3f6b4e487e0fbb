#![warn(clippy::all, missing_docs)]

//! Core command logic for the `servertp` proxy command.
//!
//! This crate resolves `<source> <destination>` redirection requests
//! against a live topology of backends and players, performs the
//! redirect through fire-and-forget dispatches, and emits the
//! out-of-band signal consumed by destination backends.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lang;
pub mod permission;
pub mod redirect;
pub mod selector;
pub mod signal;
pub mod suggest;
pub mod topology;

#[cfg(test)]
mod testing;

pub use command::ServerTeleportCommand;
pub use crate::config::{AppConfig, LangConfig};
pub use dispatch::{Dispatch, Dispatcher};
pub use error::Error;
pub use lang::Messages;
pub use permission::{CommandSource, PERMISSION};
pub use redirect::Summary;
pub use selector::{DestinationSelector, RawRequest, ResolvedDestination, Selector};
pub use signal::{ChannelId, SignalError, TeleportSignal, SIGNAL_CHANNEL};
pub use topology::{Backend, MemoryTopology, PlayerRef, Topology, TopologySnapshot};
