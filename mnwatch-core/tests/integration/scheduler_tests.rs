//! Integration tests for the batched poller
//!
//! A scripted executor stands in for SSH. Tokio time is paused, so pauses
//! and simulated command latency advance instantly.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mnwatch_core::{
    Broadcaster, Frame, HealthTag, NodeDescriptor, NodeKind, NodeStore, PollError, PollExecutor,
    PollResult, PollSettings, Poller,
};

const HP_OUTPUT: &str = "===MNWATCH_STATUS===\n\
    ║ Core Sync Progress │ 100% ║\n\
    ║ Masternode State │ READY ║\n\
    ║ Platform Enabled │ true ║\n\
    ║ Platform Status │ up ║\n\
    ===SYSMETRICS===\n\
    1.00 0.50 0.25 1/200 999\n2\n\
    Mem: 4000 1000 2000 10 1000 2800\n\
    /dev/root 40G 10G 30G 25% /\n";

const SYNCING_OUTPUT: &str = "===MNWATCH_STATUS===\n\
    ║ Core Sync Progress │ 97.40% ║\n\
    ║ Masternode State │ READY ║\n";

/// Executor that counts calls and concurrent polls
#[derive(Default)]
struct CountingExecutor {
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    /// Highest concurrency seen once `warm_up_calls` calls have started
    max_after_warm_up: AtomicUsize,
    warm_up_calls: usize,
    /// Nodes with an even ordinal fail when set
    fail_even: bool,
    /// Calls after warm-up answer with a syncing node when set
    syncing_after_warm_up: bool,
}

impl CountingExecutor {
    fn new(latency: Duration, warm_up_calls: usize) -> Self {
        Self {
            latency,
            warm_up_calls,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PollExecutor for CountingExecutor {
    async fn execute(&self, node: &NodeDescriptor) -> PollResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.warm_up_calls {
            self.max_after_warm_up.fetch_max(now, Ordering::SeqCst);
        }

        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_even && node.ordinal % 2 == 0 {
            Err(PollError::Connection("Connection refused".into()))
        } else if self.syncing_after_warm_up && call >= self.warm_up_calls {
            Ok(SYNCING_OUTPUT.to_string())
        } else {
            Ok(HP_OUTPUT.to_string())
        }
    }
}

fn fleet(count: u32) -> Vec<NodeDescriptor> {
    (1..=count)
        .map(|n| NodeDescriptor::new(NodeKind::Hp, n, format!("10.0.0.{n}")))
        .collect()
}

fn settings(concurrency: usize, poll_interval_ms: u64) -> PollSettings {
    PollSettings {
        concurrency,
        poll_interval_ms,
        ..PollSettings::default()
    }
}

async fn wait_for_calls(executor: &CountingExecutor, calls: usize) {
    while executor.calls() < calls {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_cycles_never_exceed_concurrency() {
    let nodes = fleet(25);
    let executor = Arc::new(CountingExecutor::new(Duration::from_millis(200), nodes.len()));
    let store = NodeStore::new();
    let poller = Poller::new(
        nodes.clone(),
        executor.clone(),
        store.clone(),
        Broadcaster::default(),
        settings(4, 100),
    );

    assert!(poller.start());
    // Warm-up plus two full cycles
    wait_for_calls(&executor, nodes.len() * 3).await;
    poller.stop();
    poller.join().await;

    assert_eq!(executor.max_after_warm_up.load(Ordering::SeqCst), 4);
    assert_eq!(store.len(), 25);
    assert!(store.list().iter().all(|r| r.health == HealthTag::Healthy));
}

#[tokio::test(start_paused = true)]
async fn test_warm_up_polls_everything_at_once() {
    let nodes = fleet(12);
    let executor = Arc::new(CountingExecutor::new(Duration::from_millis(200), 0));
    let poller = Poller::new(
        nodes,
        executor.clone(),
        NodeStore::new(),
        Broadcaster::default(),
        settings(3, 100),
    );

    poller.warm_up().await;
    assert_eq!(executor.calls(), 12);
    assert_eq!(executor.max_after_warm_up.load(Ordering::SeqCst), 12);
}

#[tokio::test(start_paused = true)]
async fn test_stop_between_batches() {
    let nodes = fleet(10);
    let executor = Arc::new(CountingExecutor {
        syncing_after_warm_up: true,
        ..CountingExecutor::new(Duration::from_millis(50), nodes.len())
    });
    let store = NodeStore::new();
    let broadcaster = Broadcaster::default();
    let mut subscription = broadcaster.subscribe().unwrap();
    let poller = Poller::new(
        nodes.clone(),
        executor.clone(),
        store.clone(),
        broadcaster.clone(),
        settings(2, 60_000),
    );

    poller.start();
    // Warm-up and the first batch of the first cycle
    wait_for_calls(&executor, nodes.len() + 2).await;
    assert_eq!(executor.in_flight.load(Ordering::SeqCst), 2);
    poller.stop();
    poller.join().await;

    assert!(!poller.is_running());
    assert_eq!(executor.calls(), nodes.len() + 2);
    assert_eq!(executor.in_flight.load(Ordering::SeqCst), 0);

    // The batch in flight at stop still lands in the store
    for record in store.list() {
        let expected = if record.ordinal <= 2 {
            HealthTag::Syncing
        } else {
            HealthTag::Healthy
        };
        assert_eq!(record.health, expected, "{}", record.name);
        assert!(record.error.is_none());
    }

    // ...and reaches subscribers after the warm-up updates
    assert_eq!(subscription.frames.recv().await, Some(Frame::Comment(String::new())));
    let mut updates = Vec::new();
    while let Ok(frame) = subscription.frames.try_recv() {
        if let Frame::Event { data, .. } = frame {
            updates.push(serde_json::from_str::<serde_json::Value>(&data).unwrap());
        }
    }
    assert_eq!(updates.len(), nodes.len() + 2);
    let mut late: Vec<&str> = updates[nodes.len()..]
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    late.sort_unstable();
    assert_eq!(late, ["hp-masternode-1", "hp-masternode-2"]);
    assert!(updates[nodes.len()..].iter().all(|u| u["health"] == "syncing"));
}

#[tokio::test(start_paused = true)]
async fn test_restart_skips_warm_up() {
    let nodes = fleet(6);
    let executor = Arc::new(CountingExecutor::new(Duration::from_millis(50), nodes.len()));
    let poller = Poller::new(
        nodes.clone(),
        executor.clone(),
        NodeStore::new(),
        Broadcaster::default(),
        settings(1, 10),
    );

    poller.start();
    wait_for_calls(&executor, nodes.len() + 1).await;
    poller.stop();
    poller.join().await;

    let before = executor.calls();
    assert!(poller.start());
    wait_for_calls(&executor, before + nodes.len()).await;
    poller.stop();
    poller.join().await;

    assert_eq!(executor.max_after_warm_up.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_isolated() {
    let nodes = fleet(6);
    let executor = Arc::new(CountingExecutor {
        latency: Duration::from_millis(10),
        fail_even: true,
        ..CountingExecutor::default()
    });
    let store = NodeStore::new();
    let broadcaster = Broadcaster::default();
    let mut subscription = broadcaster.subscribe().unwrap();
    let poller = Poller::new(
        nodes,
        executor,
        store.clone(),
        broadcaster.clone(),
        settings(2, 100),
    );

    poller.warm_up().await;

    for record in store.list() {
        if record.ordinal % 2 == 0 {
            assert_eq!(record.health, HealthTag::Unreachable);
            assert_eq!(record.error.as_deref(), Some("Connection refused"));
            assert!(record.status.is_none());
        } else {
            assert_eq!(record.health, HealthTag::Healthy, "{}", record.name);
            assert!(record.error.is_none());
            assert_eq!(record.system.as_ref().and_then(|s| s.cpu_percent), Some(50));
        }
    }

    assert_eq!(subscription.frames.recv().await, Some(Frame::Comment(String::new())));
    let mut updates = 0;
    while let Ok(frame) = subscription.frames.try_recv() {
        assert!(matches!(frame, Frame::Event { ref name, .. } if name == "nodeUpdate"));
        updates += 1;
    }
    assert_eq!(updates, 6);
}

#[tokio::test(start_paused = true)]
async fn test_empty_fleet_idles() {
    let executor = Arc::new(CountingExecutor::default());
    let poller = Poller::new(
        Vec::new(),
        executor.clone(),
        NodeStore::new(),
        Broadcaster::default(),
        settings(4, 1000),
    );

    poller.start();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(poller.is_running());
    poller.stop();
    poller.join().await;
    assert_eq!(executor.calls(), 0);
}
