//! Health classification tags

use std::fmt;

use serde::{Deserialize, Serialize};

/// Single-word summary of a node's operational state.
///
/// Re-derived on every poll; never accumulated across cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTag {
    /// Masternode ready and, where applicable, platform up
    Healthy,
    /// Core or platform still catching up
    Syncing,
    /// Reachable but not in a fully healthy state
    Warning,
    /// Masternode or platform reports an error
    Error,
    /// PoSe banned
    Banned,
    /// Poll failed or produced no status
    Unreachable,
    /// Not polled yet
    #[default]
    Unknown,
}

impl HealthTag {
    /// All tags in display order
    pub const ALL: [Self; 7] = [
        Self::Healthy,
        Self::Syncing,
        Self::Warning,
        Self::Error,
        Self::Banned,
        Self::Unreachable,
        Self::Unknown,
    ];

    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Syncing => "syncing",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Banned => "banned",
            Self::Unreachable => "unreachable",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
