mod host;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use servertp_core::{
    config::{self, AppConfig},
    MemoryTopology, Messages, ServerTeleportCommand, TopologySnapshot,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Drive the servertp command against a simulated proxy read from a topology file.
#[derive(Debug, Parser)]
#[command(name = "servertp", version)]
struct Args {
    /// Configuration file, created with defaults when missing.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON topology snapshot (backends, players, operators).
    #[arg(long)]
    topology: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config = match &args.config {
        Some(path) => {
            config::ensure_config_at(path)?;
            AppConfig::load_from(path)?
        }
        None => {
            config::ensure_default_config()?;
            AppConfig::load()?
        }
    };

    let snapshot = TopologySnapshot::load(&args.topology)?;
    let topology = MemoryTopology::from_snapshot(&snapshot)?;

    let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
    let host_task = tokio::spawn(host::run(topology.clone(), dispatch_rx));

    let command = ServerTeleportCommand::new(topology, dispatch_tx, Messages::new(config.lang));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        host::handle_line(&command, &snapshot.operators, &line);
        tokio::task::yield_now().await;
    }

    // Dropping the command closes the dispatch channel and lets the host drain.
    drop(command);
    host_task.await.context("host task failed")?;
    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("servertp.log");

    let env_filter = EnvFilter::from_default_env();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
