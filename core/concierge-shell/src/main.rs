//! concierge: terminal shell for the ILORA Retreats concierge session.
//!
//! Each invocation behaves like one page load on this device: it hydrates the
//! session from `~/.illora/device.json`, applies one intent and exits.
//!
//! ## Subcommands
//!
//! - `status`: current session, presence and the view that would render
//! - `login`: sign in (any credentials are accepted in demo mode)
//! - `logout`: forget this device
//! - `presence`: record whether the visitor is staying on the property
//! - `layout`: the view selected for a given viewport width

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use concierge_core::{load_config, StorageConfig};

use commands::{Shell, ShellError};

const DEFAULT_WIDTH_PX: u32 = 1280;

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "ILORA Retreats concierge session shell")]
#[command(version)]
struct Cli {
    /// Data directory (default: ~/.illora)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show session state and the selected view
    Status {
        /// Viewport width in pixels
        #[arg(long, default_value_t = DEFAULT_WIDTH_PX)]
        width: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in and wait for the login to resolve
    Login {
        /// Email or booking identifier
        #[arg(long)]
        id: String,

        #[arg(long)]
        secret: String,
    },

    /// Sign out and forget this device
    Logout,

    /// Are you staying at ILORA Retreats?
    Presence {
        #[arg(value_enum)]
        state: PresenceArg,
    },

    /// Print the view selected for a viewport width
    Layout {
        #[arg(long)]
        width: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PresenceArg {
    On,
    Off,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let storage = match cli.root.clone() {
        Some(root) => StorageConfig::with_root(root),
        None => match StorageConfig::discover() {
            Ok(storage) => storage,
            Err(err) => {
                eprintln!("concierge: {err}");
                std::process::exit(1);
            }
        },
    };
    let logging_guard = logging::init(Some(storage.logs_dir().as_path()));

    if let Err(err) = run(cli.command, &storage).await {
        tracing::error!(error = %err, "concierge command failed");
        eprintln!("concierge: {err}");
        // exit() skips destructors; flush buffered log lines first.
        drop(logging_guard);
        std::process::exit(1);
    }
}

async fn run(command: Commands, storage: &StorageConfig) -> Result<(), ShellError> {
    let config = load_config(&storage.config_file())?;
    let shell = Shell::open(storage, config)?;

    match command {
        Commands::Status { width, json } => shell.status(width, json),
        Commands::Login { id, secret } => shell.login(id, secret).await,
        Commands::Logout => shell.logout(),
        Commands::Presence { state } => shell.presence(matches!(state, PresenceArg::On)),
        Commands::Layout { width } => shell.layout(width),
    }
}
