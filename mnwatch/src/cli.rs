//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mnwatch_core::ConfigOverrides;

/// Live monitor for a masternode fleet
#[derive(Parser)]
#[command(name = "mnwatch")]
#[command(author, version, about = "Masternode fleet monitor")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "MNWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Command to run (default: serve)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Settings that win over the configuration file
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Ansible inventory listing the fleet
    #[arg(long = "inventory", env = "INVENTORY_PATH", global = true)]
    pub inventory: Option<PathBuf>,

    /// SSH private key used for every node
    #[arg(long = "key", env = "SSH_KEY_PATH", global = true)]
    pub key: Option<PathBuf>,

    /// SSH user
    #[arg(long = "user", env = "SSH_USER", global = true)]
    pub user: Option<String>,

    /// SSH port
    #[arg(long = "ssh-port", env = "SSH_PORT", global = true)]
    pub ssh_port: Option<u16>,

    /// Pause between poll batches in milliseconds
    #[arg(long = "interval-ms", env = "POLL_INTERVAL_MS", global = true)]
    pub interval_ms: Option<u64>,

    /// Nodes polled concurrently per batch
    #[arg(long = "concurrency", env = "POLL_CONCURRENCY", global = true)]
    pub concurrency: Option<usize>,

    /// HTTP listen port
    #[arg(long = "port", env = "PORT", global = true)]
    pub port: Option<u16>,
}

impl OverrideArgs {
    /// Converts into core overrides
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            inventory_path: self.inventory.clone(),
            private_key_path: self.key.clone(),
            username: self.user.clone(),
            ssh_port: self.ssh_port,
            poll_interval_ms: self.interval_ms,
            concurrency: self.concurrency,
            listen_port: self.port,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll the fleet and serve the dashboard API
    #[command(about = "Poll the fleet continuously and serve the HTTP API")]
    Serve,

    /// Poll one node once and print its record
    #[command(about = "Poll a single node once and print the result as JSON")]
    Check {
        /// Node name, e.g. hp-masternode-3
        name: String,
    },

    /// Print the parsed inventory
    #[command(about = "Show the nodes found in the inventory")]
    Inventory {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Display as formatted table
    #[default]
    Table,
    /// Output as JSON
    Json,
}
