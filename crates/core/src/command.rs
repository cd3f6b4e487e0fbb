//! The `servertp` command: permission gate, argument handling and dispatch to the engine.

use tracing::debug;

use crate::{
    dispatch::Dispatcher,
    error::Error,
    lang::Messages,
    permission::{self, CommandSource},
    redirect::{RedirectEngine, Summary},
    selector::{resolve_destination, resolve_source, RawRequest},
    suggest,
    topology::Topology,
};

/// Command handler bound to one host topology and dispatcher.
pub struct ServerTeleportCommand<T, D> {
    topology: T,
    dispatcher: D,
    messages: Messages,
}

impl<T, D> ServerTeleportCommand<T, D>
where
    T: Topology,
    D: Dispatcher,
{
    /// Create a handler; `messages` is rendered from the configuration loaded at startup.
    pub fn new(topology: T, dispatcher: D, messages: Messages) -> Self {
        Self {
            topology,
            dispatcher,
            messages,
        }
    }

    /// Topology the handler resolves against.
    pub fn topology(&self) -> &T {
        &self.topology
    }

    /// Whether the host should offer the command to `source` at all.
    pub fn has_permission(&self, source: &dyn CommandSource) -> bool {
        permission::check(source).is_ok()
    }

    /// Run `args` on behalf of `source`.
    ///
    /// Every error has already been reported to `source` when it is returned.
    pub fn execute<S: AsRef<str>>(
        &self,
        source: &dyn CommandSource,
        args: &[S],
    ) -> Result<Summary, Error> {
        let result = self.try_execute(source, args);
        if let Err(err) = &result {
            debug!("servertp rejected: {err}");
            source.send_message(&self.error_message(err));
        }
        result
    }

    fn try_execute<S: AsRef<str>>(
        &self,
        source: &dyn CommandSource,
        args: &[S],
    ) -> Result<Summary, Error> {
        permission::check(source)?;
        let request = RawRequest::from_args(args, source)?;

        let destination = resolve_destination(request.destination, &self.topology)?;
        let players = resolve_source(request.source, &self.topology);

        let engine = RedirectEngine::new(&self.topology, &self.dispatcher, &self.messages);
        Ok(engine.run(source, &players, &destination, request.destination))
    }

    fn error_message(&self, err: &Error) -> String {
        match err {
            Error::NoPermission => self.messages.no_permission(),
            Error::Usage => self.messages.usage(),
            Error::DestinationNotFound(_) => self.messages.no_server(),
        }
    }

    /// Completions for the last of `args`, which sits at position `args.len()`.
    ///
    /// Empty when `source` lacks permission or no argument has been started.
    pub fn suggest<S: AsRef<str>>(&self, source: &dyn CommandSource, args: &[S]) -> Vec<String> {
        if permission::check(source).is_err() {
            return Vec::new();
        }
        let partial: &str = args.last().map_or("", |last| last.as_ref());
        suggest::suggest(partial, args.len(), &self.topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        signal::TeleportSignal,
        testing::{lobby_and_arena, Entry, EventLog, ScriptedSource},
        topology::MemoryTopology,
    };

    fn command(log: &EventLog) -> ServerTeleportCommand<MemoryTopology, EventLog> {
        ServerTeleportCommand::new(lobby_and_arena(), log.clone(), Messages::default())
    }

    #[test]
    fn everyone_to_backend() {
        let log = EventLog::default();
        let command = command(&log);
        let source = ScriptedSource::console(&log);

        let summary = command.execute(&source, &["@a", "#arena"]).expect("redirect accepted");

        assert_eq!(summary.players, 2);
        assert_eq!(summary.destination.name, "arena");
        assert_eq!(summary.anchor, None);
        assert_eq!(
            log.source_messages(),
            ["[ServerTeleport] Sending 2 players to #arena.".to_string()]
        );
        assert_eq!(
            log.connects(),
            [
                ("alice".to_string(), "arena".to_string()),
                ("bob".to_string(), "arena".to_string()),
            ]
        );
        assert!(log.signals().is_empty());
    }

    #[test]
    fn single_token_moves_the_invoking_player() {
        let log = EventLog::default();
        let command = command(&log);
        let alice = ScriptedSource::player(&log, "alice");

        let summary = command.execute(&alice, &["bob"]).expect("redirect accepted");

        assert_eq!(summary.destination.name, "lobby");
        assert_eq!(summary.moved, 0);
        assert!(log.connects().is_empty());
        assert_eq!(
            log.signals(),
            [("lobby".to_string(), TeleportSignal::new("alice", "bob"))]
        );
        assert_eq!(
            log.source_messages(),
            ["[ServerTeleport] Sending alice to bob.".to_string()]
        );
    }

    #[test]
    fn unknown_source_backend_is_an_empty_batch() {
        let log = EventLog::default();
        let command = command(&log);
        let source = ScriptedSource::console(&log);

        let summary = command
            .execute(&source, &["#nosuch", "#arena"])
            .expect("redirect accepted");

        assert_eq!(summary.players, 0);
        assert_eq!(summary.moved, 0);
        assert_eq!(summary.signalled, 0);
        assert!(log.dispatches().is_empty());
        assert_eq!(
            log.source_messages(),
            ["[ServerTeleport] Sending 0 players to #arena.".to_string()]
        );
    }

    #[test]
    fn missing_permission_short_circuits() {
        let log = EventLog::default();
        let command = command(&log);
        let source = ScriptedSource::player(&log, "alice").denied();

        assert_eq!(
            command.execute(&source, &["@a", "#arena"]),
            Err(Error::NoPermission)
        );
        assert_eq!(
            log.entries(),
            [Entry::Source(Messages::default().no_permission())]
        );
        assert!(!command.has_permission(&source));
        assert!(command.suggest(&source, &[""]).is_empty());
    }

    #[test]
    fn console_needs_two_tokens() {
        let log = EventLog::default();
        let command = command(&log);
        let console = ScriptedSource::console(&log);

        assert_eq!(command.execute(&console, &["#arena"]), Err(Error::Usage));
        let none: [&str; 0] = [];
        assert_eq!(command.execute(&console, &none), Err(Error::Usage));
        assert_eq!(
            log.source_messages(),
            [Messages::default().usage(), Messages::default().usage()]
        );
        assert!(log.dispatches().is_empty());
    }

    #[test]
    fn unresolvable_destination_reports_no_server() {
        let log = EventLog::default();
        let command = command(&log);
        let console = ScriptedSource::console(&log);

        assert_eq!(
            command.execute(&console, &["@a", "carol"]),
            Err(Error::DestinationNotFound("carol".to_string()))
        );
        assert_eq!(log.source_messages(), [Messages::default().no_server()]);
        assert!(log.dispatches().is_empty());
    }

    #[test]
    fn backend_source_to_player_destination() {
        let log = EventLog::default();
        let command = command(&log);
        command
            .topology()
            .connect_player(crate::topology::PlayerRef::new("carol"), Some("arena"));
        let console = ScriptedSource::console(&log);

        let summary = command
            .execute(&console, &["#lobby", "carol"])
            .expect("redirect accepted");

        assert_eq!(summary.moved, 2);
        assert_eq!(summary.signalled, 2);
        let targets: Vec<_> = log
            .signals()
            .into_iter()
            .map(|(backend, signal)| (backend, signal.player, signal.target))
            .collect();
        assert_eq!(
            targets,
            [
                ("arena".to_string(), "alice".to_string(), "carol".to_string()),
                ("arena".to_string(), "bob".to_string(), "carol".to_string()),
            ]
        );
    }

    #[test]
    fn suggestions_follow_argument_position() {
        let log = EventLog::default();
        let command = command(&log);
        let console = ScriptedSource::console(&log);

        assert_eq!(command.suggest(&console, &[""]), ["@a", "#lobby", "#arena", "alice", "bob"]);
        assert_eq!(command.suggest(&console, &["#a"]), ["#arena"]);
        assert_eq!(command.suggest(&console, &["@a", ""]), ["#lobby", "#arena", "alice", "bob"]);
        assert_eq!(command.suggest(&console, &["@a", "bob"]), ["bob"]);
        assert!(command.suggest(&console, &["@a", "bob", ""]).is_empty());
    }

    #[test]
    fn no_arguments_suggest_nothing() {
        let log = EventLog::default();
        let command = command(&log);
        let console = ScriptedSource::console(&log);

        let none: [&str; 0] = [];
        assert!(command.suggest(&console, &none).is_empty());
        assert!(log.entries().is_empty());
    }
}
