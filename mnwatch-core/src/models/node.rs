//! Node descriptors loaded from the inventory

use std::fmt;

use serde::{Deserialize, Serialize};

/// Variant of a monitored node.
///
/// Selects the remote command and the status parser. Variant order is the
/// display order: HP nodes sort before regular ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// High-performance masternode running the full platform stack
    #[serde(rename = "hp")]
    Hp,
    /// Regular masternode (core only, no platform)
    #[serde(rename = "mn")]
    Regular,
}

impl NodeKind {
    /// Name prefix used for this kind in the inventory
    #[must_use]
    pub const fn name_prefix(self) -> &'static str {
        match self {
            Self::Hp => "hp-",
            Self::Regular => "",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hp => write!(f, "HP"),
            Self::Regular => write!(f, "Regular"),
        }
    }
}

/// Immutable description of one monitored node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    /// Unique identity (`[hp-]masternode-<n>`)
    pub name: String,
    /// Trailing number of the name, used for sorting and display
    #[serde(rename = "num")]
    pub ordinal: u32,
    /// Node variant
    pub kind: NodeKind,
    /// Address used for the SSH session
    pub host: String,
    /// Publicly advertised address
    #[serde(rename = "publicIp")]
    pub public_address: String,
    /// Private network address, if known
    #[serde(rename = "privateIp")]
    pub private_address: Option<String>,
    /// ProTx hash registered on chain, if known
    #[serde(rename = "protx")]
    pub chain_identity: Option<String>,
}

impl NodeDescriptor {
    /// Creates a descriptor with the public address defaulting to `host`
    #[must_use]
    pub fn new(kind: NodeKind, ordinal: u32, host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            name: format!("{}masternode-{ordinal}", kind.name_prefix()),
            ordinal,
            kind,
            public_address: host.clone(),
            host,
            private_address: None,
            chain_identity: None,
        }
    }

    /// Sets the public address
    #[must_use]
    pub fn with_public_address(mut self, address: impl Into<String>) -> Self {
        self.public_address = address.into();
        self
    }

    /// Sets the private address
    #[must_use]
    pub fn with_private_address(mut self, address: impl Into<String>) -> Self {
        self.private_address = Some(address.into());
        self
    }

    /// Sets the ProTx hash
    #[must_use]
    pub fn with_chain_identity(mut self, protx: impl Into<String>) -> Self {
        self.chain_identity = Some(protx.into());
        self
    }
}

/// Sorts descriptors kind first, then by ordinal
pub fn sort_descriptors(nodes: &mut [NodeDescriptor]) {
    nodes.sort_by(|a, b| a.kind.cmp(&b.kind).then(a.ordinal.cmp(&b.ordinal)));
}
