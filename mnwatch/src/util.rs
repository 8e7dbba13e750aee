//! Shared utility functions used across command modules.

use std::path::Path;

use mnwatch_core::{ConfigOverrides, MonitorConfig, NodeDescriptor, load_inventory};

use crate::error::CliError;

/// Loads the configuration file and applies command-line/environment values
pub fn load_config(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<MonitorConfig, CliError> {
    let mut config = MonitorConfig::load(config_path)?;
    config.apply_overrides(overrides);
    Ok(config)
}

/// Loads the inventory named by the configuration
pub fn load_nodes(config: &MonitorConfig) -> Result<Vec<NodeDescriptor>, CliError> {
    Ok(load_inventory(config.inventory_path()?)?)
}

/// Creates the multi-threaded runtime used by async commands
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Server(format!("Failed to create async runtime: {e}")))
}

/// Finds a node by exact name, then case-insensitively
pub fn find_node<'a>(nodes: &'a [NodeDescriptor], name: &str) -> Result<&'a NodeDescriptor, CliError> {
    nodes
        .iter()
        .find(|n| n.name == name)
        .or_else(|| nodes.iter().find(|n| n.name.eq_ignore_ascii_case(name)))
        .ok_or_else(|| CliError::NodeNotFound(name.to_string()))
}
