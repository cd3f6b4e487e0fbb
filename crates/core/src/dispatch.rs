//! Fire-and-forget requests issued to the host proxy.

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::{
    signal::ChannelId,
    topology::{Backend, PlayerRef},
};

/// A side effect the host should carry out on the command's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Show `message` to a connected player.
    Notify {
        /// Recipient.
        player: PlayerRef,
        /// Fully rendered text, prefix included.
        message: String,
    },
    /// Move `player` to `backend`.
    Connect {
        /// Player to move.
        player: PlayerRef,
        /// Target backend.
        backend: Backend,
    },
    /// Send an out-of-band payload to `backend` on `channel`.
    Signal {
        /// Receiving backend.
        backend: Backend,
        /// Plugin channel identifier.
        channel: ChannelId,
        /// Encoded payload.
        payload: Bytes,
    },
}

/// Sink for [`Dispatch`] requests.
///
/// Implementations must not block and do not report delivery back to the caller;
/// the host owns success and failure of every request.
pub trait Dispatcher {
    /// Hand `request` to the host.
    fn dispatch(&self, request: Dispatch);
}

impl Dispatcher for UnboundedSender<Dispatch> {
    fn dispatch(&self, request: Dispatch) {
        if let Err(err) = self.send(request) {
            warn!("host dropped dispatch channel, discarding {:?}", err.0);
        }
    }
}
