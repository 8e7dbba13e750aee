//! Poll scheduling and timeout settings
//!
//! Stored in `config.toml` next to the SSH and HTTP settings and copied into
//! the scheduler and executor at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Knobs for the poll scheduler and executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Pause between batches and between cycles, in milliseconds (default: 4000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Nodes polled concurrently per batch (default: 10)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// SSH connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Remote command timeout in seconds (default: 15)
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

const fn default_poll_interval_ms() -> u64 {
    4000
}

const fn default_concurrency() -> usize {
    10
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_command_timeout_secs() -> u64 {
    15
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            concurrency: default_concurrency(),
            connect_timeout_secs: default_connect_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

impl PollSettings {
    /// Returns the batch size, never below 1
    #[must_use]
    pub const fn effective_concurrency(&self) -> usize {
        if self.concurrency == 0 {
            1
        } else {
            self.concurrency
        }
    }

    /// Pause between batches
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Timeout for establishing the SSH session, at least one second
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        if self.connect_timeout_secs == 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_secs(self.connect_timeout_secs)
        }
    }

    /// Hard deadline for one poll: connect timeout plus command timeout
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.connect_timeout()
            .saturating_add(Duration::from_secs(self.command_timeout_secs))
    }
}
