//! Inventory listing command.

use std::fmt::Write as _;
use std::path::Path;

use mnwatch_core::{ConfigOverrides, NodeDescriptor};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{load_config, load_nodes};

/// Inventory command handler
pub fn cmd_inventory(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = load_config(config_path, overrides)?;
    let nodes = load_nodes(&config)?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&nodes)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&nodes)
                .map_err(|e| CliError::Output(format!("Failed to serialize inventory: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Format descriptors as a table string
#[must_use]
pub fn format_table(nodes: &[NodeDescriptor]) -> String {
    if nodes.is_empty() {
        return "No nodes found.".to_string();
    }

    let name_width = nodes.iter().map(|n| n.name.len()).max().unwrap_or(4).max(4);
    let host_width = nodes.iter().map(|n| n.host.len()).max().unwrap_or(4).max(4);
    let public_width = nodes
        .iter()
        .map(|n| n.public_address.len())
        .max()
        .unwrap_or(9)
        .max(9);

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<name_width$}  {:<7}  {:<host_width$}  {:<public_width$}  PROTX",
        "NAME", "KIND", "HOST", "PUBLIC IP"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<7}  {:-<host_width$}  {:-<public_width$}  {:-<5}",
        "", "", "", "", ""
    );

    for node in nodes {
        let protx = node
            .chain_identity
            .as_deref()
            .map_or("-", |p| p.get(..12).unwrap_or(p));
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<7}  {:<host_width$}  {:<public_width$}  {protx}",
            node.name,
            node.kind.to_string(),
            node.host,
            node.public_address
        );
    }

    let _ = write!(output, "\nTotal: {} node(s)", nodes.len());
    output
}
