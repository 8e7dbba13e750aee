//! Latest known state of one node

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::health::HealthTag;
use super::node::{NodeDescriptor, NodeKind};
use crate::monitoring::{ParsedStatus, SystemMetrics};

/// One entry of the node state store.
///
/// Created at startup with `health = unknown` and no metrics, then
/// overwritten on every poll completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node identity
    pub name: String,
    /// Display/sort number
    #[serde(rename = "num")]
    pub ordinal: u32,
    /// Node variant
    pub kind: NodeKind,
    /// SSH host
    pub host: String,
    /// Public address
    #[serde(rename = "publicIp")]
    pub public_address: String,
    /// Private address
    #[serde(rename = "privateIp")]
    pub private_address: Option<String>,
    /// ProTx hash from the inventory
    #[serde(rename = "protx")]
    pub chain_identity: Option<String>,
    /// Last parsed status
    pub status: Option<ParsedStatus>,
    /// Last parsed host metrics
    pub system: Option<SystemMetrics>,
    /// Current health
    pub health: HealthTag,
    /// Error text of the last failed poll
    pub error: Option<String>,
    /// Duration of the last poll
    #[serde(rename = "pollDuration")]
    pub poll_duration_ms: Option<u64>,
    /// When the record was last written
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl NodeRecord {
    /// Creates the startup record for a descriptor
    #[must_use]
    pub fn new(descriptor: &NodeDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            ordinal: descriptor.ordinal,
            kind: descriptor.kind,
            host: descriptor.host.clone(),
            public_address: descriptor.public_address.clone(),
            private_address: descriptor.private_address.clone(),
            chain_identity: descriptor.chain_identity.clone(),
            status: None,
            system: None,
            health: HealthTag::Unknown,
            error: None,
            poll_duration_ms: None,
            last_updated: None,
        }
    }

    /// Copies the descriptor fields in, keeping poll results
    pub fn refresh_descriptor(&mut self, descriptor: &NodeDescriptor) {
        self.ordinal = descriptor.ordinal;
        self.kind = descriptor.kind;
        self.host.clone_from(&descriptor.host);
        self.public_address.clone_from(&descriptor.public_address);
        self.private_address.clone_from(&descriptor.private_address);
        self.chain_identity.clone_from(&descriptor.chain_identity);
    }

    /// Replaces the poll results after a successful poll
    pub fn apply_success(
        &mut self,
        status: ParsedStatus,
        system: Option<SystemMetrics>,
        health: HealthTag,
        duration_ms: u64,
    ) {
        self.status = Some(status);
        self.system = system;
        self.health = health;
        self.error = None;
        self.poll_duration_ms = Some(duration_ms);
    }

    /// Marks the node unreachable; `status` and `system` are carried forward
    pub fn apply_failure(&mut self, error: impl Into<String>, duration_ms: u64) {
        self.health = HealthTag::Unreachable;
        self.error = Some(error.into());
        self.poll_duration_ms = Some(duration_ms);
    }
}
