//! In-memory node state store
//!
//! Holds the latest [`NodeRecord`] per node name. Poll completions from many
//! tasks write concurrently; every write replaces the record for exactly one
//! key under the map lock, so a writer never observes or clobbers a
//! half-updated record for another node.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;

use crate::models::{HealthTag, NodeDescriptor, NodeRecord};

/// Shared handle to the node records; clones see the same map
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    records: Arc<RwLock<HashMap<String, NodeRecord>>>,
}

impl NodeStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the startup record for `descriptor` unless one already exists.
    ///
    /// Returns `true` when a record was created.
    pub fn init(&self, descriptor: &NodeDescriptor) -> bool {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&descriptor.name) {
            return false;
        }
        records.insert(descriptor.name.clone(), NodeRecord::new(descriptor));
        true
    }

    /// Returns a copy of the record for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Updates the record for `descriptor` and returns the stored copy.
    ///
    /// `update` runs on the previous record (or a fresh startup record) after
    /// the descriptor fields have been refreshed, so fields it does not touch
    /// are carried forward. `last_updated` is stamped with the current time
    /// and never moves backwards for a key.
    pub fn set(
        &self,
        descriptor: &NodeDescriptor,
        update: impl FnOnce(&mut NodeRecord),
    ) -> NodeRecord {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .entry(descriptor.name.clone())
            .or_insert_with(|| NodeRecord::new(descriptor));

        record.refresh_descriptor(descriptor);
        update(record);

        let now = Utc::now();
        record.last_updated = Some(record.last_updated.map_or(now, |prev| prev.max(now)));
        record.clone()
    }

    /// Returns all records, ordered by ordinal (HP before regular on ties)
    #[must_use]
    pub fn list(&self) -> Vec<NodeRecord> {
        let mut list: Vec<NodeRecord> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            a.ordinal
                .cmp(&b.ordinal)
                .then(a.kind.cmp(&b.kind))
                .then_with(|| a.name.cmp(&b.name))
        });
        list
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store has no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts records per health tag; every tag is present, possibly as 0
    #[must_use]
    pub fn health_counts(&self) -> HashMap<HealthTag, usize> {
        let mut counts: HashMap<HealthTag, usize> =
            HealthTag::ALL.iter().map(|&tag| (tag, 0)).collect();
        for record in self.records.read().unwrap_or_else(PoisonError::into_inner).values() {
            *counts.entry(record.health).or_default() += 1;
        }
        counts
    }
}
