//! Command handler modules for the CLI.

mod check;
mod inventory;
mod serve;

use std::path::Path;

use mnwatch_core::ConfigOverrides;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    command: Option<Commands>,
) -> Result<(), CliError> {
    match command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::cmd_serve(config_path, overrides),
        Commands::Check { name } => check::cmd_check(config_path, overrides, &name),
        Commands::Inventory { format } => inventory::cmd_inventory(config_path, overrides, format),
    }
}
