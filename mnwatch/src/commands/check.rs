//! Single node poll command.

use std::path::Path;
use std::sync::Arc;

use mnwatch_core::{
    Broadcaster, ConfigOverrides, HealthTag, NodeStore, Poller, SshExecutor,
};

use crate::error::CliError;
use crate::util::{find_node, load_config, load_nodes, runtime};

/// Check command handler: polls `name` once and prints the record as JSON
pub fn cmd_check(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    name: &str,
) -> Result<(), CliError> {
    let config = load_config(config_path, overrides)?;
    let credentials = config.validate()?;
    let nodes = load_nodes(&config)?;
    let node = find_node(&nodes, name)?.clone();

    let executor = Arc::new(SshExecutor::new(credentials, config.poll));
    let poller = Poller::new(
        vec![node.clone()],
        executor,
        NodeStore::new(),
        Broadcaster::default(),
        config.poll,
    );

    let record = runtime()?.block_on(poller.poll_node(&node));
    let json = serde_json::to_string_pretty(&record)
        .map_err(|e| CliError::Output(format!("Failed to serialize record: {e}")))?;
    println!("{json}");

    if record.health == HealthTag::Unreachable {
        return Err(CliError::Unreachable(
            record.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    Ok(())
}
