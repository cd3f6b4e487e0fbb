//! Request-level errors reported back to the invoking source.

use thiserror::Error;

/// Terminal outcomes of a rejected request.
///
/// By the time one of these is returned from
/// [`ServerTeleportCommand::execute`](crate::ServerTeleportCommand::execute)
/// the matching localized message has already been sent to the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The source lacks the [`PERMISSION`](crate::PERMISSION) capability.
    #[error("source lacks the servertp permission")]
    NoPermission,
    /// Wrong argument count, or a single token from a non-player source.
    #[error("invalid usage")]
    Usage,
    /// The destination token did not resolve to a backend.
    #[error("no backend found for destination {0:?}")]
    DestinationNotFound(String),
}
