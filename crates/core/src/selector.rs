//! Parsing and resolution of source and destination tokens.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    error::Error,
    permission::CommandSource,
    topology::{Backend, PlayerRef, Topology},
};

/// Prefix marking a backend name.
pub const BACKEND_PREFIX: char = '#';

/// Token selecting every connected player.
pub const ALL_PLAYERS: &str = "@a";

/// Parsed source token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `#name`: every player currently on backend `name`.
    Backend(String),
    /// `@a`: every connected player.
    All,
    /// Bare name: exactly that player.
    Player(String),
}

impl Selector {
    /// Classify a source token.
    pub fn parse(token: &str) -> Self {
        if let Some(name) = token.strip_prefix(BACKEND_PREFIX) {
            Self::Backend(name.to_string())
        } else if token == ALL_PLAYERS {
            Self::All
        } else {
            Self::Player(token.to_string())
        }
    }

    /// Players the selector denotes, in discovery order without duplicates.
    ///
    /// Unknown backends and players yield an empty set.
    pub fn resolve<T: Topology + ?Sized>(&self, topology: &T) -> Vec<PlayerRef> {
        let players = match self {
            Self::Backend(name) => topology
                .backend(name)
                .map(|backend| topology.players_on(&backend))
                .unwrap_or_default(),
            Self::All => topology.players(),
            Self::Player(name) => topology.player(name).into_iter().collect(),
        };

        let mut seen = HashSet::new();
        players
            .into_iter()
            .filter(|player| seen.insert(player.name.clone()))
            .collect()
    }
}

/// Parsed destination token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationSelector {
    /// `#name`: backend `name`.
    Backend(String),
    /// Bare name: wherever that player currently is.
    Player(String),
}

/// Destination backend plus the player that anchored it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    /// Backend players are moved to.
    pub backend: Backend,
    /// Set iff the token was a player name.
    pub anchor: Option<PlayerRef>,
}

impl DestinationSelector {
    /// Classify a destination token.
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix(BACKEND_PREFIX) {
            Some(name) => Self::Backend(name.to_string()),
            None => Self::Player(token.to_string()),
        }
    }

    /// Resolve to exactly one backend.
    ///
    /// A player destination fails when the player is unknown or has no current
    /// backend (mid-transfer).
    pub fn resolve<T: Topology + ?Sized>(&self, topology: &T) -> Option<ResolvedDestination> {
        match self {
            Self::Backend(name) => topology.backend(name).map(|backend| ResolvedDestination {
                backend,
                anchor: None,
            }),
            Self::Player(name) => {
                let anchor = topology.player(name)?;
                let backend = topology.current_backend(&anchor)?;
                Some(ResolvedDestination {
                    backend,
                    anchor: Some(anchor),
                })
            }
        }
    }
}

/// Resolve a source token against `topology`.
pub fn resolve_source<T: Topology + ?Sized>(token: &str, topology: &T) -> Vec<PlayerRef> {
    let players = Selector::parse(token).resolve(topology);
    debug!("source {token:?} resolved to {} players", players.len());
    players
}

/// Resolve a destination token against `topology`.
pub fn resolve_destination<T: Topology + ?Sized>(
    token: &str,
    topology: &T,
) -> Result<ResolvedDestination, Error> {
    let resolved = DestinationSelector::parse(token).resolve(topology);
    match &resolved {
        Some(destination) => debug!(
            "destination {token:?} resolved to {} (anchor {:?})",
            destination.backend.name,
            destination.anchor.as_ref().map(|player| player.name.as_str())
        ),
        None => debug!("destination {token:?} did not resolve"),
    }
    resolved.ok_or_else(|| Error::DestinationNotFound(token.to_string()))
}

/// Source and destination tokens after applying the argument-count rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRequest<'a> {
    /// Source token; the invoking player's own name when only one token was given.
    pub source: &'a str,
    /// Destination token as typed.
    pub destination: &'a str,
}

impl<'a> RawRequest<'a> {
    /// Two or more tokens are `<source> <destination>` (extras are ignored); a
    /// single token is the destination for a player source. Anything else is
    /// [`Error::Usage`].
    pub fn from_args<S: AsRef<str>>(
        args: &'a [S],
        source: &'a dyn CommandSource,
    ) -> Result<Self, Error> {
        match args {
            [src, dst, ..] => Ok(Self {
                source: src.as_ref(),
                destination: dst.as_ref(),
            }),
            [dst] => match source.player_name() {
                Some(name) => Ok(Self {
                    source: name,
                    destination: dst.as_ref(),
                }),
                None => Err(Error::Usage),
            },
            [] => Err(Error::Usage),
        }
    }
}
