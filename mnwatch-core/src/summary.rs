//! Aggregate fleet health

use serde::{Deserialize, Serialize};

use crate::broadcast::Broadcaster;
use crate::models::HealthTag;
use crate::store::NodeStore;

/// Node counts per health tag plus the live subscriber count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    /// Number of records in the store
    pub total_nodes: usize,
    /// Live stream subscribers
    pub sse_clients: usize,
    /// `healthy` nodes
    pub healthy: usize,
    /// `syncing` nodes
    pub syncing: usize,
    /// `warning` nodes
    pub warning: usize,
    /// `error` nodes
    pub error: usize,
    /// `banned` nodes
    pub banned: usize,
    /// `unreachable` nodes
    pub unreachable: usize,
    /// `unknown` nodes (not polled yet)
    pub unknown: usize,
}

impl FleetSummary {
    /// Snapshots the store and broadcaster
    #[must_use]
    pub fn collect(store: &NodeStore, broadcaster: &Broadcaster) -> Self {
        let counts = store.health_counts();
        let count = |tag: HealthTag| counts.get(&tag).copied().unwrap_or(0);
        Self {
            total_nodes: counts.values().sum(),
            sse_clients: broadcaster.subscriber_count(),
            healthy: count(HealthTag::Healthy),
            syncing: count(HealthTag::Syncing),
            warning: count(HealthTag::Warning),
            error: count(HealthTag::Error),
            banned: count(HealthTag::Banned),
            unreachable: count(HealthTag::Unreachable),
            unknown: count(HealthTag::Unknown),
        }
    }
}
