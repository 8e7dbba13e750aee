//! Property-based tests for health classification

use proptest::prelude::*;

use mnwatch_core::{HealthTag, ParsedStatus, classify};

/// Strategy for masternode states seen in the wild
fn arb_state() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("READY".to_string()),
        Just("WAITING_FOR_PROTX".to_string()),
        Just("POSE_BANNED".to_string()),
        Just("ERROR".to_string()),
        Just("REMOVED".to_string()),
    ])
}

/// Strategy for platform service states
fn arb_platform_status() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("up".to_string()),
        Just("syncing".to_string()),
        Just("wait_for_core".to_string()),
        Just("error".to_string()),
        Just("stopped".to_string()),
    ])
}

/// Strategy for core sync progress strings
fn arb_progress() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("100%".to_string()),
        (0u32..9999).prop_map(|p| format!("{:.2}%", f64::from(p) / 100.0)),
    ])
}

/// Strategy for parsed statuses with at least the platform flag set
fn arb_status() -> impl Strategy<Value = ParsedStatus> {
    (
        arb_state(),
        arb_platform_status(),
        arb_progress(),
        prop::option::of(prop_oneof![Just("up".to_string()), Just("syncing".to_string())]),
        any::<bool>(),
    )
        .prop_map(|(state, platform, progress, service, platform_enabled)| ParsedStatus {
            masternode_state: state,
            platform_status: platform,
            core_sync_progress: progress,
            core_service_status: service,
            platform_enabled: Some(platform_enabled),
            ..ParsedStatus::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: a parsed status never classifies as unknown or unreachable
    #[test]
    fn prop_status_is_always_classified(status in arb_status()) {
        let tag = classify(Some(&status));
        prop_assert_ne!(tag, HealthTag::Unknown);
        prop_assert_ne!(tag, HealthTag::Unreachable);
    }

    /// Property: a PoSe ban wins over every other field
    #[test]
    fn prop_ban_dominates(mut status in arb_status()) {
        status.masternode_state = Some("POSE_BANNED".to_string());
        prop_assert_eq!(classify(Some(&status)), HealthTag::Banned);
    }

    /// Property: healthy requires a READY masternode and a synced core
    #[test]
    fn prop_healthy_requires_ready_and_synced(status in arb_status()) {
        if classify(Some(&status)) == HealthTag::Healthy {
            prop_assert_eq!(status.masternode_state.as_deref(), Some("READY"));
            prop_assert!(status.core_synced());
        }
    }

    /// Property: an unsynced core is never healthy
    #[test]
    fn prop_unsynced_core_not_healthy(mut status in arb_status(), p in 0u32..9999) {
        status.core_sync_progress = Some(format!("{:.2}%", f64::from(p) / 100.0));
        prop_assert_ne!(classify(Some(&status)), HealthTag::Healthy);
    }
}

#[test]
fn test_missing_status_is_unreachable() {
    assert_eq!(classify(None), HealthTag::Unreachable);
    assert_eq!(classify(Some(&ParsedStatus::default())), HealthTag::Unreachable);
}
