//! CLI error types and exit codes.

use mnwatch_core::error::{ConfigError, InventoryError, MnwatchError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, inventory, server or IO errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Node failure - the polled node is unknown or unreachable
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inventory error
    #[error("Inventory error: {0}")]
    Inventory(String),

    /// Node not in the inventory
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Poll of a node failed
    #[error("Node unreachable: {0}")]
    Unreachable(String),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),

    /// Serialization error
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<InventoryError> for CliError {
    fn from(err: InventoryError) -> Self {
        Self::Inventory(err.to_string())
    }
}

impl From<MnwatchError> for CliError {
    fn from(err: MnwatchError) -> Self {
        match err {
            MnwatchError::Config(e) => e.into(),
            MnwatchError::Inventory(e) => e.into(),
            MnwatchError::Poll(e) => Self::Unreachable(e.to_string()),
            MnwatchError::Broadcast(e) => Self::Server(e.to_string()),
            MnwatchError::Io(e) => Self::Io(e),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, inventory, server, IO)
    /// - 2: Node failure (unknown or unreachable node)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NodeNotFound(_) | Self::Unreachable(_) => exit_codes::CONNECTION_FAILURE,
            Self::Config(_)
            | Self::Inventory(_)
            | Self::Server(_)
            | Self::Output(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
