//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// slotz - find free meeting slots for a group of attendees
#[derive(Debug, Parser)]
#[command(name = "slotz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "SLOTZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Path to the server socket
    #[arg(long, env = "SLOTZ_SOCKET")]
    pub socket_path: Option<PathBuf>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the server in the foreground
    Serve {
        /// Seed data file (overrides `seed_file` in the config)
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Maximum number of concurrent client connections
        #[arg(long)]
        max_connections: Option<usize>,
    },

    /// Check that the server is running
    Ping,

    /// Ask the server to shut down
    Stop,

    /// List known attendees
    Attendees,

    /// List stored meetings
    Meetings,

    /// Find free slots, best first
    Find(FindArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `slotz find`.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// Attendee name (can be repeated; unknown names are ignored)
    #[arg(long = "attendee", short, action = clap::ArgAction::Append)]
    pub attendees: Vec<String>,

    /// Meeting length in seconds
    #[arg(long, short, allow_negative_numbers = true)]
    pub duration: i64,

    /// Window start, RFC 3339 (e.g. 2022-06-06T09:00:00Z)
    #[arg(long, short)]
    pub start: String,

    /// Window end, RFC 3339
    #[arg(long, short)]
    pub end: String,

    /// Search the seed data in-process instead of asking the server
    #[arg(long)]
    pub offline: bool,

    /// Seed data file for --offline (overrides `seed_file` in the config)
    #[arg(long, requires = "offline")]
    pub seed: Option<PathBuf>,

    /// Show at most this many slots
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration and seed data
    Validate,

    /// Show configuration file path
    Path,
}
