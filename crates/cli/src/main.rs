//! # TrackerBlocker
//!
//! Keeps a compiled content blocking rule list in sync with the tracker data
//! set and the user's whitelist.

mod bootstrap;
mod commands;
mod di;

use clap::{Parser, Subcommand};
use trackerblocker_domain::CliOverrides;

#[derive(Parser)]
#[command(name = "trackerblocker")]
#[command(version)]
#[command(about = "Tracker blocking rule list manager")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<String>,

    /// Directory for caches and persisted state
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<String>,

    /// Tracker data set URL
    #[arg(long, global = true)]
    tds_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the rule list manager until Ctrl-C
    Run {
        /// Seconds between tracker data refreshes
        #[arg(long)]
        refresh_interval: Option<u64>,
    },
    /// Edit the whitelisted domains
    Whitelist {
        #[command(subcommand)]
        action: WhitelistAction,
    },
    /// Show the persisted ETag and rule list identifier
    Status,
}

#[derive(Subcommand)]
enum WhitelistAction {
    Add { domain: String },
    Remove { domain: String },
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let refresh_interval_secs = match &cli.command {
        Command::Run { refresh_interval } => *refresh_interval,
        _ => None,
    };
    let overrides = CliOverrides {
        tds_url: cli.tds_url,
        data_dir: cli.data_dir,
        log_level: cli.log_level,
        refresh_interval_secs,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    match cli.command {
        Command::Run { .. } => commands::run(&config).await,
        Command::Whitelist { action } => match action {
            WhitelistAction::Add { domain } => commands::whitelist_add(&config, &domain).await,
            WhitelistAction::Remove { domain } => {
                commands::whitelist_remove(&config, &domain).await
            }
            WhitelistAction::List => commands::whitelist_list(&config).await,
        },
        Command::Status => commands::status(&config).await,
    }
}
