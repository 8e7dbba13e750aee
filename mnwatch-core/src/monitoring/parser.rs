//! Parsers for remote poll output
//!
//! A poll runs one composite shell command per node: the kind-specific
//! status command, then [`SYSMETRICS_MARKER`] and four system commands.
//! Sections are delimited by ASCII marker lines so the parser can split them
//! reliably even when individual commands fail or print nothing.
//!
//! Every parser here is lenient: missing or malformed input yields absent
//! fields, never an error.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::metrics::{ParsedStatus, SystemMetrics};
use crate::models::NodeKind;

macro_rules! status_marker {
    () => {
        "===MNWATCH_STATUS==="
    };
}

macro_rules! masternode_marker {
    () => {
        "===MNWATCH_MASTERNODE==="
    };
}

macro_rules! sysmetrics_marker {
    () => {
        "===SYSMETRICS==="
    };
}

macro_rules! hp_status_command {
    () => {
        concat!("echo '", status_marker!(), "';", "sudo -u dashmate dashmate status;")
    };
}

macro_rules! regular_status_command {
    () => {
        concat!(
            "echo '",
            status_marker!(),
            "';",
            "dash-cli getblockchaininfo;",
            "echo '",
            masternode_marker!(),
            "';",
            "dash-cli masternode status;",
        )
    };
}

macro_rules! system_metrics_command {
    () => {
        concat!(
            "echo '",
            sysmetrics_marker!(),
            "';",
            "head -1 /proc/loadavg;",
            "nproc;",
            "free -m | grep Mem;",
            "df -h / | tail -1",
        )
    };
}

/// Marker printed before the status command output
pub const STATUS_MARKER: &str = status_marker!();

/// Marker separating the chain and masternode JSON documents (regular nodes)
pub const MASTERNODE_MARKER: &str = masternode_marker!();

/// Marker printed before the system metrics block
pub const SYSMETRICS_MARKER: &str = sysmetrics_marker!();

/// Status part of the HP poll command
pub const HP_STATUS_COMMAND: &str = hp_status_command!();

/// Status part of the regular poll command
pub const REGULAR_STATUS_COMMAND: &str = regular_status_command!();

/// Shell commands producing the four-line system metrics block.
///
/// Order matters: load average, core count, `free -m` Mem line, `df -h /` line.
pub const SYSTEM_METRICS_COMMAND: &str = system_metrics_command!();

/// Full poll command for HP nodes
pub const HP_POLL_COMMAND: &str = concat!(hp_status_command!(), system_metrics_command!());

/// Full poll command for regular nodes
pub const REGULAR_POLL_COMMAND: &str = concat!(regular_status_command!(), system_metrics_command!());

/// Table row: `║ key │ value ║`, ASCII `|` accepted for every border
static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[║|]\s*(.+?)\s*[│|]\s*(.+?)\s*[║|]").expect("TABLE_ROW is a valid regex pattern")
});

/// Returns the composite poll command for a node kind
#[must_use]
pub const fn poll_command(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Hp => HP_POLL_COMMAND,
        NodeKind::Regular => REGULAR_POLL_COMMAND,
    }
}

/// Status and metrics parsed from one successful poll
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutput {
    /// Parsed status section
    pub status: ParsedStatus,
    /// Parsed metrics block, absent when the marker never appeared
    pub system: Option<SystemMetrics>,
}

/// Stateless parser for remote poll output
pub struct OutputParser;

impl OutputParser {
    /// Splits combined output and parses both halves with the kind's parser
    #[must_use]
    pub fn parse_poll_output(kind: NodeKind, output: &str) -> PollOutput {
        let status_section = Self::status_section(output);
        let status = match kind {
            NodeKind::Hp => Self::parse_table_status(status_section),
            NodeKind::Regular => Self::parse_json_status(status_section),
        };
        let system = Self::metrics_block(output).map(Self::parse_system_metrics);
        PollOutput { status, system }
    }

    /// Whether the output carries usable status data for `kind`.
    ///
    /// HP output must contain at least one table row with a recognized,
    /// non-`n/a` value; regular output must contain at least one JSON object
    /// in the status section.
    #[must_use]
    pub fn has_status_evidence(kind: NodeKind, output: &str) -> bool {
        let section = Self::status_section(output);
        match kind {
            NodeKind::Hp => !Self::parse_table_status(section).is_empty(),
            NodeKind::Regular => {
                let (chain, masternode) = Self::json_documents(section);
                Self::parse_object(chain).is_some() || Self::parse_object(masternode).is_some()
            }
        }
    }

    /// Text between [`STATUS_MARKER`] (or the start) and [`SYSMETRICS_MARKER`] (or the end)
    fn status_section(output: &str) -> &str {
        let start = output
            .find(STATUS_MARKER)
            .map_or(0, |i| i + STATUS_MARKER.len());
        let rest = &output[start..];
        rest.find(SYSMETRICS_MARKER).map_or(rest, |end| &rest[..end])
    }

    /// Text after [`SYSMETRICS_MARKER`]
    fn metrics_block(output: &str) -> Option<&str> {
        output
            .find(SYSMETRICS_MARKER)
            .map(|i| &output[i + SYSMETRICS_MARKER.len()..])
    }

    /// Parses the four-line system metrics block.
    ///
    /// Lines, after dropping blank ones:
    /// 1. `/proc/loadavg`: `0.52 0.48 0.41 2/350 12345`
    /// 2. `nproc`: `4`
    /// 3. `free -m` Mem line: `Mem: 7839 4521 234 123 3083 2994`
    /// 4. `df -h /` line: `/dev/root 58G 23G 36G 39% /`
    #[must_use]
    pub fn parse_system_metrics(block: &str) -> SystemMetrics {
        let lines: Vec<&str> = block
            .trim()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect();
        let mut metrics = SystemMetrics::default();

        if let Some(line) = lines.first() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let p = |i: usize| -> f64 {
                parts
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0)
            };
            metrics.load_avg1 = Some(p(0));
            metrics.load_avg5 = Some(p(1));
            metrics.load_avg15 = Some(p(2));
        }

        if let Some(line) = lines.get(1) {
            let cores = line
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&c| c > 0)
                .unwrap_or(1);
            let load = metrics.load_avg1.unwrap_or(0.0);
            metrics.cpu_cores = Some(cores);
            metrics.cpu_percent = Some((load / f64::from(cores) * 100.0).round() as u32);
        }

        if let Some(line) = lines.get(2) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let p = |i: usize| -> Option<u64> { parts.get(i).and_then(|v| v.parse().ok()) };
            let total = p(1).unwrap_or(0);
            let used = p(2).unwrap_or(0);
            let free = p(3).unwrap_or(0);
            metrics.mem_total_mb = Some(total);
            metrics.mem_used_mb = Some(used);
            metrics.mem_free_mb = Some(free);
            metrics.mem_available_mb = Some(p(6).filter(|&v| v > 0).unwrap_or(free));
            metrics.mem_percent = Some(if total > 0 {
                (used as f64 / total as f64 * 100.0).round() as u32
            } else {
                0
            });
        }

        if let Some(line) = lines.get(3) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let s = |i: usize| parts.get(i).map(|v| (*v).to_string());
            metrics.disk_total = s(1);
            metrics.disk_used = s(2);
            metrics.disk_free = s(3);
            metrics.disk_percent = Some(
                parts
                    .get(4)
                    .and_then(|v| v.trim_end_matches('%').parse::<u32>().ok())
                    .map_or(0, |v| v.min(100)),
            );
        }

        metrics
    }

    /// Parses the box-drawn two-column table printed by `dashmate status`.
    ///
    /// Example row: `║ Core Version           │ 23.0.2      ║`.
    /// `n/a` values map to absent fields; unknown keys are ignored.
    #[must_use]
    pub fn parse_table_status(output: &str) -> ParsedStatus {
        let mut status = ParsedStatus::default();

        for line in output.lines() {
            let Some(caps) = TABLE_ROW.captures(line) else {
                continue;
            };
            let key = caps[1].trim();
            let raw = caps[2].trim();
            let value = (raw != "n/a").then_some(raw);
            let text = || value.map(str::to_string);
            let int = || value.and_then(|v| v.parse::<u64>().ok());
            let flag = || value.map(|v| v == "true");

            match key {
                "Network" => status.network = text(),
                "Core Version" => status.core_version = text(),
                "Core Status" => status.core_status = text(),
                "Core Service Status" => status.core_service_status = text(),
                "Core Size" => status.core_size = text(),
                "Core Height" => status.core_height = int(),
                "Core Sync Progress" => status.core_sync_progress = text(),
                "Masternode Enabled" => status.masternode_enabled = flag(),
                "Masternode State" => status.masternode_state = text(),
                "Masternode ProTX" => status.masternode_pro_tx = text(),
                "PoSe Penalty" => status.pose_penalty = int(),
                "Last paid block" => status.last_paid_block = int(),
                "Last paid time" => status.last_paid_time = text(),
                "Payment queue position" => status.payment_queue_position = int(),
                "Next payment time" => status.next_payment_time = text(),
                "Platform Enabled" => status.platform_enabled = flag(),
                "Platform Status" => status.platform_status = text(),
                "Platform Version" => status.platform_version = text(),
                "Platform Block Height" => status.platform_block_height = int(),
                "Platform Peers" => status.platform_peers = int(),
                "Platform Network" => status.platform_network = text(),
                _ => {}
            }
        }

        status
    }

    /// Parses the regular-node status section: `getblockchaininfo` JSON,
    /// [`MASTERNODE_MARKER`], then `masternode status` JSON.
    #[must_use]
    pub fn parse_json_status(section: &str) -> ParsedStatus {
        let (chain, masternode) = Self::json_documents(section);
        Self::parse_json_documents(chain, masternode)
    }

    /// Parses the two JSON documents independently.
    ///
    /// A document that fails to parse leaves its fields absent without
    /// affecting the other one. `platform_enabled` is always `false`.
    #[must_use]
    pub fn parse_json_documents(chain_json: &str, masternode_json: &str) -> ParsedStatus {
        let mut status = ParsedStatus::default();

        if let Some(chain) = Self::parse_object(chain_json) {
            status.network = chain.get("chain").and_then(Value::as_str).map(|c| {
                if c == "test" {
                    "testnet".to_string()
                } else {
                    c.to_string()
                }
            });
            status.core_height = chain
                .get("blocks")
                .and_then(Value::as_u64)
                .filter(|&h| h > 0);
            let ibd = chain
                .get("initialblockdownload")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            status.core_service_status = Some(if ibd { "syncing" } else { "up" }.to_string());
            status.core_sync_progress = chain
                .get("verificationprogress")
                .and_then(Value::as_f64)
                .map(|p| {
                    if p >= 0.9999 {
                        "100%".to_string()
                    } else {
                        format!("{:.2}%", p * 100.0)
                    }
                });
            status.core_size = chain
                .get("size_on_disk")
                .and_then(Value::as_f64)
                .filter(|&b| b > 0.0)
                .map(|b| format!("{:.1} GB", b / 1024_f64.powi(3)));
        }

        if let Some(mn) = Self::parse_object(masternode_json) {
            let upper = |key: &str| {
                mn.get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_uppercase)
            };
            status.masternode_state = upper("state").or_else(|| upper("status"));
            status.masternode_pro_tx = mn
                .get("proTxHash")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            if let Some(dmn) = mn.get("dmnState") {
                status.pose_penalty = dmn.get("PoSePenalty").and_then(Value::as_u64);
                if dmn
                    .get("PoSeBanHeight")
                    .and_then(Value::as_i64)
                    .is_some_and(|h| h > 0)
                {
                    status.masternode_state = Some("POSE_BANNED".to_string());
                }
                status.last_paid_block = dmn
                    .get("lastPaidHeight")
                    .and_then(Value::as_u64)
                    .filter(|&h| h > 0);
            }
        }

        status.platform_enabled = Some(false);
        status.platform_status = None;
        status
    }

    /// Splits the regular status section at [`MASTERNODE_MARKER`]
    fn json_documents(section: &str) -> (&str, &str) {
        section
            .split_once(MASTERNODE_MARKER)
            .unwrap_or((section, ""))
    }

    /// Parses a JSON object, `None` for anything else
    fn parse_object(text: &str) -> Option<serde_json::Map<String, Value>> {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                if !text.trim().is_empty() {
                    tracing::trace!(error = %e, "Status document is not valid JSON");
                }
                None
            }
        }
    }
}
