//! Property-based tests for the node store

use proptest::prelude::*;

use mnwatch_core::{HealthTag, NodeDescriptor, NodeKind, NodeStore};

/// Strategy for node kinds
fn arb_kind() -> impl Strategy<Value = NodeKind> {
    prop_oneof![Just(NodeKind::Hp), Just(NodeKind::Regular)]
}

/// Strategy for descriptors with small ordinals so names collide
fn arb_descriptor() -> impl Strategy<Value = NodeDescriptor> {
    (arb_kind(), 1u32..30, 1u8..255)
        .prop_map(|(kind, ordinal, octet)| NodeDescriptor::new(kind, ordinal, format!("10.0.0.{octet}")))
}

/// Strategy for health tags
fn arb_health() -> impl Strategy<Value = HealthTag> {
    prop::sample::select(HealthTag::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: one record per name, listed by ordinal with HP first on ties
    #[test]
    fn prop_list_is_ordered(updates in prop::collection::vec((arb_descriptor(), arb_health()), 0..40)) {
        let store = NodeStore::new();
        for (descriptor, health) in &updates {
            store.set(descriptor, |r| r.health = *health);
        }

        let list = store.list();
        let mut names: Vec<&str> = updates.iter().map(|(d, _)| d.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(list.len(), names.len());
        for pair in list.windows(2) {
            prop_assert!((pair[0].ordinal, pair[0].kind) <= (pair[1].ordinal, pair[1].kind));
        }
    }

    /// Property: the last write per name wins, descriptor fields included
    #[test]
    fn prop_last_write_wins(updates in prop::collection::vec((arb_descriptor(), arb_health()), 1..40)) {
        let store = NodeStore::new();
        for (descriptor, health) in &updates {
            store.set(descriptor, |r| r.health = *health);
        }

        for record in store.list() {
            let (descriptor, health) = updates
                .iter()
                .rev()
                .find(|(d, _)| d.name == record.name)
                .unwrap();
            prop_assert_eq!(record.health, *health);
            prop_assert_eq!(&record.host, &descriptor.host);
        }
    }

    /// Property: health counts cover every tag and sum to the record count
    #[test]
    fn prop_health_counts_sum(updates in prop::collection::vec((arb_descriptor(), arb_health()), 0..40)) {
        let store = NodeStore::new();
        for (descriptor, health) in &updates {
            store.set(descriptor, |r| r.health = *health);
        }

        let counts = store.health_counts();
        prop_assert_eq!(counts.len(), HealthTag::ALL.len());
        prop_assert_eq!(counts.values().sum::<usize>(), store.len());
    }

    /// Property: last_updated never moves backwards for a node
    #[test]
    fn prop_last_updated_monotonic(descriptor in arb_descriptor(), writes in 1usize..20) {
        let store = NodeStore::new();
        let mut previous = None;
        for _ in 0..writes {
            let record = store.set(&descriptor, |_| {});
            let stamp = record.last_updated;
            prop_assert!(stamp.is_some());
            prop_assert!(previous <= stamp);
            previous = stamp;
        }
    }
}
