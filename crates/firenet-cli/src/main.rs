//! Firenet CLI
//!
//! Single binary for working with the server selection coordinator:
//! - Server list management (servers, add)
//! - Selection (select) and status inspection (status)
//! - An interactive session that connects, switches and disconnects

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firenet::commands::{self, SelectTarget};
use firenet::output::print_error;
use firenet_coordinator::TomlServerStore;

#[derive(Parser)]
#[command(name = "firenet")]
#[command(author, version, about = "VPN server selection and connection coordinator")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the servers file (overrides config)
    #[arg(long, global = true, env = "FIRENET_STORE")]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured servers
    /// Alias: ls
    #[command(alias = "ls")]
    Servers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a server to the end of the list
    Add {
        /// Server guid
        guid: String,
        /// Display name
        name: String,
    },

    /// Select a server by guid or list position
    Select {
        /// Server guid
        #[arg(required_unless_present = "position")]
        guid: Option<String>,
        /// List position instead of a guid
        #[arg(short, long, conflicts_with = "guid")]
        position: Option<usize>,
    },

    /// Show selection and connection status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive connection session
    Session,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Write a configuration file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Status { json: false });

    // Config commands work without a loadable configuration
    let command = match command {
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => commands::config_show(cli.config.as_ref())?,
                ConfigAction::Path => commands::config_path(cli.config.as_ref()),
                ConfigAction::Init { force } => {
                    commands::config_init(cli.config.as_ref(), force)?
                }
            }
            return Ok(());
        }
        command => command,
    };

    let settings = commands::load_settings(cli.config.as_ref())?;
    let store_path = cli.store.unwrap_or_else(|| settings.store.path.clone());
    tracing::debug!("Using servers file {:?}", store_path);
    let store = Arc::new(TomlServerStore::new(store_path));

    match command {
        Commands::Servers { json } => {
            commands::servers_command(&store, json).await?;
        }

        Commands::Add { guid, name } => {
            commands::add_command(&store, &guid, &name).await?;
        }

        Commands::Select { guid, position } => {
            let target = match (guid, position) {
                (_, Some(position)) => SelectTarget::Position(position),
                (Some(guid), None) => SelectTarget::Guid(guid),
                (None, None) => anyhow::bail!("Pass a server guid or --position"),
            };
            let (coordinator, _tunnel) = commands::open_coordinator(&settings, store).await?;
            commands::select_command(&coordinator, target).await?;
        }

        Commands::Status { json } => {
            let (coordinator, _tunnel) = commands::open_coordinator(&settings, store).await?;
            commands::status_command(&coordinator, json).await?;
        }

        Commands::Session => {
            let (coordinator, _tunnel) = commands::open_coordinator(&settings, store).await?;
            commands::run_session(coordinator).await?;
        }

        // Handled above
        Commands::Config { .. } => {}
    }

    Ok(())
}
