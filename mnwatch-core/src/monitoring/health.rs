//! Health classification of parsed status
//!
//! Rules are evaluated in order and the first match wins. The ordering is
//! load-bearing: a banned or erroring node is never reported as syncing, and
//! platform state only decides `healthy` once core is synced and the
//! masternode is `READY`.

use super::metrics::ParsedStatus;
use crate::models::HealthTag;

/// Derives the health tag for a parsed status.
///
/// `None` and an empty status both classify as [`HealthTag::Unreachable`].
#[must_use]
pub fn classify(status: Option<&ParsedStatus>) -> HealthTag {
    let Some(status) = status.filter(|s| !s.is_empty()) else {
        return HealthTag::Unreachable;
    };

    let state = status.masternode_state.as_deref();
    let platform = status.platform_status.as_deref();

    if state == Some("POSE_BANNED") {
        return HealthTag::Banned;
    }
    if state == Some("ERROR") || platform == Some("error") {
        return HealthTag::Error;
    }
    if !status.core_synced() {
        return HealthTag::Syncing;
    }
    if matches!(platform, Some("syncing" | "wait_for_core")) {
        return HealthTag::Syncing;
    }
    if state == Some("READY") {
        // Regular nodes have no platform; HP nodes need it up
        if status.platform_enabled == Some(false) || platform == Some("up") {
            return HealthTag::Healthy;
        }
        return HealthTag::Warning;
    }
    HealthTag::Warning
}
