//! Error types for the polling engine
//!
//! Each concern has its own error enum with a matching result alias.
//! [`MnwatchError`] wraps them for callers that only need to report.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single node poll did not produce a usable status.
///
/// The `Display` text is what ends up in `NodeRecord.error`, so it is kept
/// short and free of prefixes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollError {
    /// The remote session could not be established (network, auth, host key)
    #[error("{0}")]
    Connection(String),

    /// The session was established but the command invocation itself failed
    #[error("{0}")]
    Command(String),

    /// Connect + execute deadline exceeded
    #[error("timeout")]
    Timeout,

    /// The command finished but the expected status section is missing
    #[error("{0}")]
    MalformedOutput(String),
}

impl PollError {
    /// Short machine-friendly name of the failure class, used in log fields
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Command(_) => "command",
            Self::Timeout => "timeout",
            Self::MalformedOutput(_) => "malformed_output",
        }
    }
}

/// Result type for poll operations
pub type PollResult<T> = Result<T, PollError>;

/// Errors returned by the update broadcaster
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BroadcastError {
    /// The live-subscriber ceiling has been reached
    #[error("Too many live subscribers (limit {limit})")]
    CapacityReached {
        /// Configured ceiling
        limit: usize,
    },

    /// The broadcaster has been shut down
    #[error("Broadcaster is shut down")]
    Closed,
}

/// Result type for broadcaster operations
pub type BroadcastResult<T> = Result<T, BroadcastError>;

/// Errors that can occur while loading the node inventory
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The inventory file could not be read
    #[error("Failed to read inventory {path}: {reason}")]
    Read {
        /// Inventory path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// The inventory contained no usable node lines
    #[error("No masternodes found in inventory {path}")]
    Empty {
        /// Inventory path
        path: PathBuf,
    },
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config {path}: {reason}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// Failed to parse the configuration file
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A configuration value is out of range or missing
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The SSH private key is missing or unreadable
    #[error("Private key {path}: {reason}")]
    PrivateKey {
        /// Key path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Umbrella error for the crate
#[derive(Debug, Error)]
pub enum MnwatchError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Inventory error
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Poll error
    #[error("Poll failed: {0}")]
    Poll(#[from] PollError),

    /// Broadcaster error
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for crate-level operations
pub type MnwatchResult<T> = Result<T, MnwatchError>;
