//! CLI command definitions for the `agora` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod history;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Real-time multi-user chat server.
#[derive(Parser)]
#[command(name = "agora", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP/WebSocket chat server.
    Serve {
        /// Port to listen on (defaults to `port` in config.toml).
        #[arg(short, long, env = "AGORA_PORT")]
        port: Option<u16>,

        /// Host to bind to (defaults to `host` in config.toml).
        #[arg(long, env = "AGORA_HOST")]
        host: Option<String>,

        /// Also export trace spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Print the stored chat history, oldest first.
    History,

    /// Delete a stored message.
    #[command(alias = "rm")]
    Delete {
        /// Message id.
        id: i64,

        /// Skip confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
