//! ServerSee - Minecraft server monitor
//!
//! Command-line front end: probes configured servers, talks to their agents
//! and keeps a live view of all of them.

mod commands;
mod telemetry;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serversee_config::FileProvider;
use tracing::error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = FileProvider::DEFAULT_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Prints the status of every server, or of the one named
    Status {
        name: Option<String>,

        /// Ask the public status API instead of the server or its agent
        #[arg(long)]
        public: bool,

        /// Print JSON instead of a summary line
        #[arg(long)]
        json: bool,
    },

    /// Refreshes all servers every `poll_interval` until interrupted
    Watch,

    /// Current metrics of an agent-managed server
    Metrics {
        name: String,

        /// Print up to this many history samples instead
        #[arg(long)]
        history: Option<u32>,
    },

    /// Follows the console of an agent-managed server
    Logs {
        name: String,

        /// Keep colour and formatting codes
        #[arg(long)]
        raw: bool,
    },

    /// Runs a console command on an agent-managed server
    Command {
        name: String,

        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Shows or edits the whitelist of an agent-managed server
    Whitelist {
        name: String,

        #[command(subcommand)]
        action: Option<WhitelistAction>,
    },
}

#[derive(Subcommand)]
pub enum WhitelistAction {
    On,
    Off,
    Add { player: String },
    Remove { player: String },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match FileProvider::try_load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Failed to load configuration from {}: {}",
                args.config.display(),
                e
            );
            process::exit(1);
        }
    };

    telemetry::init_subscriber(&config.logging);

    if let Err(e) = commands::run(config, args.command).await {
        error!("{:#}", e);
        process::exit(1);
    }
}
