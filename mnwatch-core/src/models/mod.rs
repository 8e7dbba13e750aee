//! Core data structures: node descriptors, health tags and node records

mod health;
mod node;
mod record;

pub use health::HealthTag;
pub use node::{NodeDescriptor, NodeKind, sort_descriptors};
pub use record::NodeRecord;
