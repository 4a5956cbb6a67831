//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conditional swap order scheduler
#[derive(Parser, Debug)]
#[command(name = "trigger-swap")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler and the quote broadcaster until Ctrl-C
    Run,

    /// Load and validate the configuration file
    CheckConfig,

    /// Inspect and manage orders
    #[command(subcommand)]
    Orders(OrdersCommand),
}

/// Subcommands for `trigger-swap orders`.
#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
    /// List active orders.
    List,
    /// Cancel an active order.
    Cancel {
        /// Order identifier.
        id: String,
    },
}
