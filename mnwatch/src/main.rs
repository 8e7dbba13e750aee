//! `mnwatch` - live monitor for a masternode fleet
//!
//! Polls every node of an Ansible inventory over SSH, keeps the latest
//! status in memory and serves it over HTTP with a live event stream.

mod cli;
mod commands;
mod error;
mod http;
mod util;

use clap::Parser;
use cli::Cli;
use mnwatch_core::tracing::{TracingConfig, TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let tracing_config =
        TracingConfig::new().with_level(TracingLevel::from_verbosity(cli.verbose, cli.quiet));
    let tracing_config = match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.is_empty() => tracing_config.with_filter(filter),
        _ => tracing_config,
    };
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: {e}");
    }

    let overrides = cli.overrides.to_overrides();
    let result = commands::dispatch(config_path, &overrides, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
