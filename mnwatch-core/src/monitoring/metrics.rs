//! Data models for parsed remote output
//!
//! All types are serializable; field names follow the dashboard's JSON keys.
//! Fields are optional because every parser returns a best-effort partial
//! record instead of failing.

use serde::{Deserialize, Serialize};

/// Host-level metrics parsed from the `===SYSMETRICS===` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    /// 1-minute load average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_avg1: Option<f64>,
    /// 5-minute load average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_avg5: Option<f64>,
    /// 15-minute load average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_avg15: Option<f64>,
    /// Online CPU count (at least 1 when present)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    /// `round(load_avg1 / cpu_cores * 100)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<u32>,
    /// Total memory (MB)
    #[serde(default, rename = "memTotalMB", skip_serializing_if = "Option::is_none")]
    pub mem_total_mb: Option<u64>,
    /// Used memory (MB)
    #[serde(default, rename = "memUsedMB", skip_serializing_if = "Option::is_none")]
    pub mem_used_mb: Option<u64>,
    /// Free memory (MB)
    #[serde(default, rename = "memFreeMB", skip_serializing_if = "Option::is_none")]
    pub mem_free_mb: Option<u64>,
    /// Available memory (MB), falls back to free memory
    #[serde(default, rename = "memAvailableMB", skip_serializing_if = "Option::is_none")]
    pub mem_available_mb: Option<u64>,
    /// `round(used / total * 100)`, 0 when total is 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_percent: Option<u32>,
    /// Root filesystem size as printed by `df -h` (e.g. "58G")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_total: Option<String>,
    /// Root filesystem usage as printed by `df -h`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_used: Option<String>,
    /// Root filesystem free space as printed by `df -h`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_free: Option<String>,
    /// Root filesystem usage (0–100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<u32>,
}

/// Masternode and chain status.
///
/// HP nodes fill it from the `dashmate status` table, regular nodes from
/// `dash-cli` JSON. Both populate the subset the classifier reads:
/// `core_service_status`, `core_sync_progress`, `masternode_state`,
/// `pose_penalty`, `platform_enabled` and `platform_status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStatus {
    /// Network name (`mainnet`, `testnet`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Core daemon version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_version: Option<String>,
    /// Core daemon status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_status: Option<String>,
    /// Core service status (`up`, `syncing`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_service_status: Option<String>,
    /// Chain size on disk (human readable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_size: Option<String>,
    /// Core block height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_height: Option<u64>,
    /// Sync progress as a percentage string (`"100%"` when synced)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_sync_progress: Option<String>,
    /// Whether the masternode is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masternode_enabled: Option<bool>,
    /// Masternode state (`READY`, `POSE_BANNED`, `ERROR`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masternode_state: Option<String>,
    /// ProTx hash reported by the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masternode_pro_tx: Option<String>,
    /// PoSe penalty score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_penalty: Option<u64>,
    /// Height of the last paid block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_paid_block: Option<u64>,
    /// Time of the last payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_paid_time: Option<String>,
    /// Position in the payment queue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_queue_position: Option<u64>,
    /// Estimated next payment time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_time: Option<String>,
    /// Whether the platform layer is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_enabled: Option<bool>,
    /// Platform status (`up`, `syncing`, `wait_for_core`, `error`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_status: Option<String>,
    /// Platform version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,
    /// Platform block height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_block_height: Option<u64>,
    /// Connected platform peers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_peers: Option<u64>,
    /// Platform network name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_network: Option<String>,
}

impl ParsedStatus {
    /// Returns true when no field was recognized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether core reports full sync
    #[must_use]
    pub fn core_synced(&self) -> bool {
        self.core_service_status.as_deref() != Some("syncing")
            && self
                .core_sync_progress
                .as_deref()
                .is_none_or(|progress| progress == "100%")
    }
}
