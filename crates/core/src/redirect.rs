//! Batched redirection of resolved players to a destination backend.

use tracing::{info, warn};

use crate::{
    dispatch::{Dispatch, Dispatcher},
    lang::Messages,
    permission::CommandSource,
    selector::ResolvedDestination,
    signal::{TeleportSignal, SIGNAL_CHANNEL},
    topology::{Backend, PlayerRef, Topology},
};

/// What a redirect issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Players the source token resolved to, including those already there.
    pub players: usize,
    /// Connect requests issued.
    pub moved: usize,
    /// Signals issued to the destination backend.
    pub signalled: usize,
    /// Destination backend.
    pub destination: Backend,
    /// Anchor player when the destination was a player name.
    pub anchor: Option<PlayerRef>,
}

/// Issues the summary, notifications, moves and signals for one request.
pub struct RedirectEngine<'a, T: ?Sized, D: ?Sized> {
    topology: &'a T,
    dispatcher: &'a D,
    messages: &'a Messages,
}

impl<'a, T, D> RedirectEngine<'a, T, D>
where
    T: Topology + ?Sized,
    D: Dispatcher + ?Sized,
{
    /// Borrow the collaborators for one request.
    pub fn new(topology: &'a T, dispatcher: &'a D, messages: &'a Messages) -> Self {
        Self {
            topology,
            dispatcher,
            messages,
        }
    }

    /// Redirect `players` to `destination`.
    ///
    /// The summary reaches `source` before anything is dispatched. Players
    /// already on the destination are neither notified nor moved, but still
    /// count towards the summary and still get a signal when there is an
    /// anchor. `destination_token` is echoed in the summary exactly as typed.
    pub fn run(
        &self,
        source: &dyn CommandSource,
        players: &[PlayerRef],
        destination: &ResolvedDestination,
        destination_token: &str,
    ) -> Summary {
        let phrasing = match players {
            [only] => self.messages.player_name(&only.name),
            _ => self.messages.player_num(players.len()),
        };
        source.send_message(&self.messages.success(&phrasing, destination_token));

        let target = &destination.backend;
        let mut moved = 0;
        for player in players {
            if self.topology.current_backend(player).as_ref() == Some(target) {
                continue;
            }
            self.dispatcher.dispatch(Dispatch::Notify {
                player: player.clone(),
                message: self.messages.notification(&target.name),
            });
            self.dispatcher.dispatch(Dispatch::Connect {
                player: player.clone(),
                backend: target.clone(),
            });
            moved += 1;
        }

        let mut signalled = 0;
        if let Some(anchor) = &destination.anchor {
            for player in players {
                match TeleportSignal::new(&player.name, &anchor.name).encode() {
                    Ok(payload) => {
                        self.dispatcher.dispatch(Dispatch::Signal {
                            backend: target.clone(),
                            channel: SIGNAL_CHANNEL,
                            payload,
                        });
                        signalled += 1;
                    }
                    Err(err) => warn!("skipping signal for {}: {err}", player.name),
                }
            }
        }

        info!(
            "redirected {} players to {} ({} moved, {} signalled)",
            players.len(),
            target.name,
            moved,
            signalled
        );

        Summary {
            players: players.len(),
            moved,
            signalled,
            destination: target.clone(),
            anchor: destination.anchor.clone(),
        }
    }
}
