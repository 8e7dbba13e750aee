//! Remote polling of masternodes
//!
//! Executes one composite SSH command per node, parses the table or JSON
//! status plus host metrics, classifies health and drives the fleet-wide
//! poll cycles.

mod health;
mod metrics;
mod parser;
pub mod scheduler;
mod settings;
pub mod ssh_exec;

pub use health::classify;
pub use metrics::{ParsedStatus, SystemMetrics};
pub use parser::{
    HP_POLL_COMMAND, HP_STATUS_COMMAND, MASTERNODE_MARKER, OutputParser, PollOutput,
    REGULAR_POLL_COMMAND, REGULAR_STATUS_COMMAND, STATUS_MARKER, SYSMETRICS_MARKER,
    SYSTEM_METRICS_COMMAND, poll_command,
};
pub use scheduler::{NODE_UPDATE_EVENT, Poller};
pub use settings::PollSettings;
pub use ssh_exec::{PollExecutor, SshExecutor, interpret_output};
