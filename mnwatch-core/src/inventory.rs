//! Ansible-style inventory loader
//!
//! Only host lines naming a masternode are read; groups, variables and
//! comments are ignored:
//!
//! ```text
//! [hp_masternodes]
//! hp-masternode-1 ansible_host=10.0.0.1 public_ip=203.0.113.1 protx=ab12...
//! masternode-3 ansible_host=10.0.1.3 private_ip=192.168.1.3
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{NodeDescriptor, NodeKind, sort_descriptors};

static HOST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((hp-)?masternode-(\d+))\s+(.+)").expect("HOST_LINE is a valid regex pattern")
});

/// Reads and parses an inventory file.
///
/// # Errors
///
/// Returns [`InventoryError::Read`] if the file cannot be read and
/// [`InventoryError::Empty`] if it names no usable node.
pub fn load_inventory(path: &Path) -> InventoryResult<Vec<NodeDescriptor>> {
    let content = std::fs::read_to_string(path).map_err(|e| InventoryError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let nodes = parse_inventory(&content);
    if nodes.is_empty() {
        return Err(InventoryError::Empty {
            path: path.to_path_buf(),
        });
    }

    let hp = nodes.iter().filter(|n| n.kind == NodeKind::Hp).count();
    tracing::info!(
        path = %path.display(),
        total = nodes.len(),
        hp,
        regular = nodes.len() - hp,
        "Inventory loaded"
    );
    Ok(nodes)
}

/// Parses inventory text into sorted descriptors (HP first, then by number).
///
/// Lines without `ansible_host` are skipped. When a name repeats, the first
/// line wins.
#[must_use]
pub fn parse_inventory(content: &str) -> Vec<NodeDescriptor> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let Some(caps) = HOST_LINE.captures(line) else {
            continue;
        };
        let name = &caps[1];
        let kind = if caps.get(2).is_some() {
            NodeKind::Hp
        } else {
            NodeKind::Regular
        };
        let Ok(ordinal) = caps[3].parse::<u32>() else {
            tracing::warn!(line = index + 1, name, "Node number out of range, skipping");
            continue;
        };

        let attr = |key: &str| {
            caps[4].split_whitespace().find_map(|token| {
                token
                    .split_once('=')
                    .filter(|(k, _)| *k == key)
                    .map(|(_, v)| v.trim_matches(|c: char| c == '"' || c == '\''))
                    .filter(|v| !v.is_empty())
            })
        };

        let Some(host) = attr("ansible_host") else {
            tracing::debug!(line = index + 1, name, "No ansible_host, skipping");
            continue;
        };
        if !seen.insert(name.to_string()) {
            tracing::warn!(line = index + 1, name, "Duplicate node name, keeping the first");
            continue;
        }

        let mut node = NodeDescriptor::new(kind, ordinal, host);
        if let Some(public) = attr("public_ip") {
            node = node.with_public_address(public);
        }
        if let Some(private) = attr("private_ip") {
            node = node.with_private_address(private);
        }
        if let Some(protx) = attr("protx") {
            node = node.with_chain_identity(protx);
        }
        nodes.push(node);
    }

    sort_descriptors(&mut nodes);
    nodes
}
