//! Simulated proxy host: applies dispatched requests and feeds stdin lines to the command.

use servertp_core::{
    CommandSource, Dispatch, Dispatcher, MemoryTopology, ServerTeleportCommand, TeleportSignal,
    Topology, PERMISSION,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// Name that runs the command as the proxy console.
const CONSOLE: &str = "console";

/// Apply requests until every sender is gone.
pub async fn run(topology: MemoryTopology, mut requests: UnboundedReceiver<Dispatch>) {
    while let Some(request) = requests.recv().await {
        match request {
            Dispatch::Notify { player, message } => {
                if topology.player(&player.name).is_some() {
                    println!("[to {}] {message}", player.name);
                }
            }
            Dispatch::Connect { player, backend } => {
                if topology.set_current_backend(&player, &backend) {
                    info!("{} connected to {}", player.name, backend.name);
                } else {
                    warn!("could not connect {} to {}", player.name, backend.name);
                }
            }
            Dispatch::Signal {
                backend,
                channel,
                payload,
            } => match TeleportSignal::decode(payload) {
                Ok(signal) => println!(
                    "[{} on {channel}] teleport {} to {}",
                    backend.name, signal.player, signal.target
                ),
                Err(err) => warn!("undecodable signal for {}: {err}", backend.name),
            },
        }
    }
}

/// Source created per input line.
struct ConsoleSource {
    player: Option<String>,
    permitted: bool,
}

impl CommandSource for ConsoleSource {
    fn has_permission(&self, permission: &str) -> bool {
        self.permitted && permission == PERMISSION
    }

    fn player_name(&self) -> Option<&str> {
        self.player.as_deref()
    }

    fn send_message(&self, message: &str) {
        match &self.player {
            Some(name) => println!("[to {name}] {message}"),
            None => println!("{message}"),
        }
    }
}

/// One parsed stdin line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Players,
    Run { actor: &'a str, args: Vec<&'a str> },
    Suggest { actor: &'a str, args: Vec<&'a str> },
}

fn parse_line(line: &str) -> Input<'_> {
    let trimmed = line.trim_start();
    if trimmed.trim_end() == "players" {
        return Input::Players;
    }

    let (suggest, rest) = match trimmed.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let mut tokens = rest.split_whitespace();
    let Some(actor) = tokens.next() else {
        return Input::Empty;
    };
    let mut args: Vec<&str> = tokens.collect();

    if suggest {
        // A trailing space starts a new, empty token.
        if rest.ends_with(char::is_whitespace) {
            args.push("");
        }
        Input::Suggest { actor, args }
    } else {
        Input::Run { actor, args }
    }
}

/// `name @ backend` per connected player, `-` while mid-transfer.
fn player_listing(topology: &MemoryTopology) -> Vec<String> {
    topology
        .snapshot()
        .players
        .into_iter()
        .map(|entry| {
            let backend = entry.backend.unwrap_or_else(|| "-".to_string());
            format!("{} @ {backend}", entry.name)
        })
        .collect()
}

/// Execute one stdin line against `command`.
pub fn handle_line<D: Dispatcher>(
    command: &ServerTeleportCommand<MemoryTopology, D>,
    operators: &[String],
    line: &str,
) {
    let topology = command.topology();
    let (actor, args, suggest) = match parse_line(line) {
        Input::Empty => return,
        Input::Players => {
            for line in player_listing(topology) {
                println!("{line}");
            }
            return;
        }
        Input::Run { actor, args } => (actor, args, false),
        Input::Suggest { actor, args } => (actor, args, true),
    };

    let source = if actor == CONSOLE {
        ConsoleSource {
            player: None,
            permitted: true,
        }
    } else if topology.player(actor).is_some() {
        ConsoleSource {
            player: Some(actor.to_string()),
            permitted: operators.iter().any(|operator| operator == actor),
        }
    } else {
        println!("unknown player {actor}");
        return;
    };

    if suggest {
        println!("{}", command.suggest(&source, &args).join(" "));
    } else if let Err(err) = command.execute(&source, &args) {
        info!("{actor}: {err}");
    }
}
