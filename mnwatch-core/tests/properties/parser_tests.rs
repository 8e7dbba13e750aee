//! Property-based tests for poll output parsing
//!
//! The parsers must never panic and must stay within their documented ranges
//! no matter what a remote host prints.

use proptest::prelude::*;

use mnwatch_core::NodeKind;
use mnwatch_core::monitoring::{STATUS_MARKER, SYSMETRICS_MARKER};
use mnwatch_core::OutputParser;

// ============================================================================
// Strategies for generating test data
// ============================================================================

/// Strategy for load average text with two decimals
fn arb_load() -> impl Strategy<Value = String> {
    (0u32..400, 0u32..100).prop_map(|(whole, frac)| format!("{whole}.{frac:02}"))
}

/// Strategy for a `free -m` Mem line with used <= total
fn arb_mem_line() -> impl Strategy<Value = (String, u64, u64, u64, u64)> {
    (1u64..200_000)
        .prop_flat_map(|total| (Just(total), 0..=total, 0..=total, 0u64..200_000))
        .prop_map(|(total, used, free, available)| {
            (
                format!("Mem: {total} {used} {free} 12 300 {available}"),
                total,
                used,
                free,
                available,
            )
        })
}

/// Strategy for table values, including the `n/a` placeholder
fn arb_table_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("n/a".to_string()),
        "[A-Za-z0-9_.]{1,16}",
        (0u64..10_000_000).prop_map(|n| n.to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: arbitrary output never panics any parser
    #[test]
    fn prop_parsers_never_panic(output in ".{0,400}") {
        let _ = OutputParser::parse_poll_output(NodeKind::Hp, &output);
        let _ = OutputParser::parse_poll_output(NodeKind::Regular, &output);
        let _ = OutputParser::parse_system_metrics(&output);
        let _ = OutputParser::has_status_evidence(NodeKind::Hp, &output);
        let _ = OutputParser::has_status_evidence(NodeKind::Regular, &output);
    }

    /// Property: cpu percent is load1 over cores, rounded
    #[test]
    fn prop_cpu_percent_from_load(load in arb_load(), cores in 1u32..128) {
        let block = format!("{load} 0.10 0.05 1/100 42\n{cores}\n");
        let metrics = OutputParser::parse_system_metrics(&block);

        let load1: f64 = load.parse().unwrap();
        let expected = (load1 / f64::from(cores) * 100.0).round() as u32;
        prop_assert_eq!(metrics.cpu_cores, Some(cores));
        prop_assert_eq!(metrics.cpu_percent, Some(expected));
        prop_assert_eq!(metrics.load_avg1, Some(load1));
    }

    /// Property: memory percent stays within 0..=100 and available falls back to free
    #[test]
    fn prop_memory_fields((line, total, used, free, available) in arb_mem_line()) {
        let block = format!("0.00 0.00 0.00 1/1 1\n2\n{line}\n");
        let metrics = OutputParser::parse_system_metrics(&block);

        prop_assert_eq!(metrics.mem_total_mb, Some(total));
        prop_assert_eq!(metrics.mem_used_mb, Some(used));
        prop_assert!(metrics.mem_percent.unwrap() <= 100);
        let expected_available = if available > 0 { available } else { free };
        prop_assert_eq!(metrics.mem_available_mb, Some(expected_available));
    }

    /// Property: disk percent is clamped to 100
    #[test]
    fn prop_disk_percent_clamped(percent in 0u32..1000) {
        let block = format!("0 0 0\n1\nMem: 1 1 0 0 0 0\n/dev/root 58G 23G 36G {percent}% /\n");
        let metrics = OutputParser::parse_system_metrics(&block);
        prop_assert_eq!(metrics.disk_percent, Some(percent.min(100)));
        prop_assert_eq!(metrics.disk_total.as_deref(), Some("58G"));
    }

    /// Property: numeric table rows round-trip and `n/a` means absent
    #[test]
    fn prop_table_values(height in arb_table_value(), version in arb_table_value()) {
        let table = format!(
            "╔══════╗\n║ Core Height │ {height} ║\n║ Core Version │ {version} ║\n╚══════╝\n"
        );
        let status = OutputParser::parse_table_status(&table);

        prop_assert_eq!(status.core_height, height.parse::<u64>().ok());
        if version == "n/a" {
            prop_assert!(status.core_version.is_none());
        } else {
            prop_assert_eq!(status.core_version.as_deref(), Some(version.as_str()));
        }
    }

    /// Property: a broken masternode document leaves chain fields intact
    #[test]
    fn prop_json_documents_independent(blocks in 1u64..10_000_000, garbage in "[^{}]{0,40}") {
        let chain = format!(r#"{{"chain":"main","blocks":{blocks},"initialblockdownload":false}}"#);
        let status = OutputParser::parse_json_documents(&chain, &garbage);

        prop_assert_eq!(status.core_height, Some(blocks));
        prop_assert_eq!(status.network.as_deref(), Some("main"));
        prop_assert!(status.masternode_state.is_none());
        prop_assert_eq!(status.platform_enabled, Some(false));
    }

    /// Property: the metrics block is only read after its marker
    #[test]
    fn prop_metrics_require_marker(cores in 1u32..64) {
        let without = format!("{STATUS_MARKER}\n║ Masternode State │ READY ║\n");
        prop_assert!(OutputParser::parse_poll_output(NodeKind::Hp, &without).system.is_none());

        let with = format!("{without}{SYSMETRICS_MARKER}\n1.00 0 0\n{cores}\n");
        let parsed = OutputParser::parse_poll_output(NodeKind::Hp, &with);
        prop_assert_eq!(parsed.system.and_then(|s| s.cpu_cores), Some(cores));
        prop_assert_eq!(parsed.status.masternode_state.as_deref(), Some("READY"));
    }
}
