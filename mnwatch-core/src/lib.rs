//! mnwatch Core Library
//!
//! Polling engine behind the mnwatch masternode dashboard: SSH polls with a
//! hard deadline, batched scheduling across the fleet, parsing of
//! `dashmate status` tables and `dash-cli` JSON, health classification, the
//! node state store and the live update broadcaster.
//!
//! # Crate Structure
//!
//! - [`models`] - Node descriptors, records and health tags
//! - [`inventory`] - Ansible inventory loader
//! - [`monitoring`] - Executor, parsers, classifier and scheduler
//! - [`store`] - Latest record per node
//! - [`broadcast`] - Live update fan-out
//! - [`config`] - TOML configuration and overrides

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod broadcast;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod monitoring;
pub mod store;
pub mod summary;
pub mod tracing;

pub use broadcast::{Broadcaster, Frame, Subscription};
pub use config::{ConfigOverrides, HttpSettings, MonitorConfig, SshCredentials, SshSettings};
pub use error::{
    BroadcastError, BroadcastResult, ConfigError, ConfigResult, InventoryError, InventoryResult,
    MnwatchError, MnwatchResult, PollError, PollResult,
};
pub use inventory::{load_inventory, parse_inventory};
pub use models::{HealthTag, NodeDescriptor, NodeKind, NodeRecord, sort_descriptors};
pub use monitoring::{
    OutputParser, ParsedStatus, PollExecutor, PollSettings, Poller, SshExecutor, SystemMetrics,
    classify,
};
pub use store::NodeStore;
pub use summary::FleetSummary;
