//! Permission gate and the invoking command source.

use crate::error::Error;

/// Capability required to run or tab-complete the command.
pub const PERMISSION: &str = "servertp";

/// Whoever issued the command: the console, or a connected player.
pub trait CommandSource {
    /// Host permission lookup.
    fn has_permission(&self, permission: &str) -> bool;

    /// Username when the source is a connected player.
    fn player_name(&self) -> Option<&str>;

    /// Deliver a rendered message to the source.
    fn send_message(&self, message: &str);
}

/// Gate every request on [`PERMISSION`].
pub fn check(source: &dyn CommandSource) -> Result<(), Error> {
    if source.has_permission(PERMISSION) {
        Ok(())
    } else {
        Err(Error::NoPermission)
    }
}
