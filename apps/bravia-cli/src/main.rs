//! bravia - command-line remote for Sony BRAVIA televisions.
//!
//! Discovers televisions on the local network, lists what a device offers,
//! and runs batches of remote buttons and direct commands against it.

mod config;
mod render;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use bravia_core::{discover_with_config, BraviaError, CommandOutcome, Session};
use clap::{CommandFactory, Parser};

use crate::config::CliConfig;

const USAGE_EXAMPLE: &str = "Example:\n    bravia -s 192.168.0.111 -k 8888 -c \"VolumeUp\"";

/// bravia - control a Sony BRAVIA television over the local network.
#[derive(Parser, Debug)]
#[command(name = "bravia")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Television IP address (overrides config file).
    #[arg(short = 's', long = "server", value_name = "IPADDR")]
    server: Option<String>,

    /// Pre-shared key (overrides config file).
    #[arg(short = 'k', long = "pskkey", value_name = "PSK")]
    pskkey: Option<String>,

    /// Print input sources, remote commands and device information.
    #[arg(short = 'l', long = "list-device-info")]
    list_device_info: bool,

    /// Comma-separated commands, e.g. `VolumeUp,setInputSource(HDMI 1)`.
    #[arg(short = 'c', long = "commands", value_name = "COMMANDS", value_delimiter = ',')]
    commands: Vec<String>,

    /// Search the local network for televisions.
    #[arg(long)]
    discover: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn", env = "BRAVIA_LOG_LEVEL")]
    log_level: log::LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::debug!("bravia v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(server) = args.server.clone() {
        config.host = Some(server);
    }
    if let Some(psk) = args.pskkey.clone() {
        config.psk = Some(psk);
    }

    config
        .client
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    if args.discover {
        return run_discover(&config).await;
    }

    if !args.list_device_info && args.commands.is_empty() {
        Args::command().print_help()?;
        return Ok(());
    }

    let mut session = connect(&config).await?;

    if args.list_device_info {
        println!("{}", render::device_info(session.capabilities()));
    }

    if !args.commands.is_empty() {
        run_commands(&mut session, args.commands).await?;
    }

    Ok(())
}

async fn run_discover(config: &CliConfig) -> Result<()> {
    let devices = discover_with_config(&config.client.ssdp_config())
        .await
        .map_err(|e| report(BraviaError::from(e)))?;

    for device in &devices {
        println!("{}", render::discovered_device(device));
    }
    Ok(())
}

async fn connect(config: &CliConfig) -> Result<Session> {
    let Some(host) = config.host.as_deref() else {
        bail!("server ip is missing\n  {}", USAGE_EXAMPLE);
    };
    if config.psk.is_none() {
        log::warn!("No PSK configured; the television will likely reject requests");
    }

    let mut session = Session::with_config(host, config.psk.clone(), &config.client)
        .map_err(|e| report(BraviaError::from(e)))?;

    session
        .connect()
        .await
        .map_err(|e| report(BraviaError::from(e)))?;

    Ok(session)
}

async fn run_commands(session: &mut Session, commands: Vec<String>) -> Result<()> {
    let outcomes = session.execute(commands).await;

    for outcome in &outcomes {
        println!("{}", render::outcome(outcome));
    }

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, CommandOutcome::Failed { .. }))
        .count();
    if failed > 0 {
        bail!("{} of {} command(s) failed", failed, outcomes.len());
    }
    Ok(())
}

/// Formats a library error with its stable code.
fn report(err: BraviaError) -> anyhow::Error {
    anyhow!("[{}] {}", err.code(), err)
}
