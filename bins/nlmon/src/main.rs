//! nlmon - resolve generic netlink families and watch nl80211 events.

mod commands;

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use nlmux::netlink::{ManagerConfig, NetlinkManager, NetlinkSocket};

#[derive(Parser)]
#[command(name = "nlmon", version, about = "Generic netlink and nl80211 monitor")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Reply timeout in milliseconds.
    #[arg(long, default_value_t = 5000, global = true)]
    timeout: u64,

    /// Family lookup deadline in milliseconds.
    #[arg(long, default_value_t = 1000, global = true)]
    family_wait: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a generic netlink family.
    #[command(visible_alias = "f")]
    Family(commands::family::FamilyCmd),

    /// Dump wireless PHYs.
    #[command(visible_alias = "phy")]
    Wiphy(commands::wiphy::WiphyCmd),

    /// Print nl80211 multicast events.
    #[command(visible_alias = "m", visible_alias = "mon")]
    Monitor(commands::monitor::MonitorCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let config = ManagerConfig::new()
        .with_response_timeout(Duration::from_millis(cli.timeout))
        .with_family_wait(Duration::from_millis(cli.family_wait));
    let manager = NetlinkManager::with_config(NetlinkSocket::new()?, config);

    let result = match cli.command {
        Command::Family(cmd) => cmd.run(manager),
        Command::Wiphy(cmd) => cmd.run(manager).await,
        Command::Monitor(cmd) => cmd.run(manager).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
