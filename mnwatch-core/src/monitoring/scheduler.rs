//! Fleet poll scheduler
//!
//! On first start every node is polled at once (warm-up burst) so the store
//! fills as fast as the slowest node answers. After that the fleet is polled
//! in fixed-size batches: each batch runs concurrently and is awaited as a
//! unit, then the scheduler pauses for the poll interval. The running flag is
//! checked before every batch; stopping never cancels polls already in
//! flight.
//!
//! Each poll completion writes the store and publishes a `nodeUpdate` event
//! on its own, without waiting for its batch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::health::classify;
use super::parser::{OutputParser, PollOutput};
use super::settings::PollSettings;
use super::ssh_exec::PollExecutor;
use crate::broadcast::Broadcaster;
use crate::error::{PollError, PollResult};
use crate::models::{HealthTag, NodeDescriptor, NodeRecord};
use crate::store::NodeStore;

/// Event name published after every poll
pub const NODE_UPDATE_EVENT: &str = "nodeUpdate";

struct Inner {
    nodes: Vec<NodeDescriptor>,
    executor: Arc<dyn PollExecutor>,
    store: NodeStore,
    broadcaster: Broadcaster,
    settings: PollSettings,
    running: watch::Sender<bool>,
    generation: AtomicU64,
    warmed_up: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to the poll scheduler; clones control the same scheduler
#[derive(Clone)]
pub struct Poller {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("nodes", &self.inner.nodes.len())
            .field("settings", &self.inner.settings)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Creates a stopped scheduler over `nodes`
    #[must_use]
    pub fn new(
        nodes: Vec<NodeDescriptor>,
        executor: Arc<dyn PollExecutor>,
        store: NodeStore,
        broadcaster: Broadcaster,
        settings: PollSettings,
    ) -> Self {
        let (running, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                nodes,
                executor,
                store,
                broadcaster,
                settings,
                running,
                generation: AtomicU64::new(0),
                warmed_up: AtomicBool::new(false),
                task: Mutex::new(None),
            }),
        }
    }

    /// Whether the polling loop is supposed to run
    #[must_use]
    pub fn is_running(&self) -> bool {
        *self.inner.running.borrow()
    }

    /// Starts the polling loop in the background.
    ///
    /// Returns `false` if it was already running. The warm-up burst only
    /// happens on the first start.
    pub fn start(&self) -> bool {
        if self.inner.running.send_replace(true) {
            return false;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let mut task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = task.take();
        let poller = self.clone();
        *task = Some(tokio::spawn(async move {
            // A loop from an earlier start exits at its next batch boundary
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            poller.run(generation).await;
        }));
        drop(task);

        tracing::info!(
            nodes = self.inner.nodes.len(),
            concurrency = self.inner.settings.effective_concurrency(),
            interval_ms = self.inner.settings.poll_interval_ms,
            "Poller started"
        );
        true
    }

    /// Clears the running flag.
    ///
    /// The loop exits at its next flag check; polls already in flight still
    /// complete and update the store.
    pub fn stop(&self) {
        if self.inner.running.send_replace(false) {
            tracing::info!("Poller stopping");
        }
    }

    /// Waits for the background loop to exit after [`Self::stop`]
    pub async fn join(&self) {
        let handle = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Poller task ended abnormally");
        }
    }

    /// Polls every node concurrently and waits for all of them
    pub async fn warm_up(&self) {
        let started = Instant::now();
        tracing::info!(nodes = self.inner.nodes.len(), "Warm-up: polling all nodes");
        let records = join_all(self.inner.nodes.iter().map(|node| self.poll_node(node))).await;
        let reachable = records
            .iter()
            .filter(|r| r.health != HealthTag::Unreachable)
            .count();
        tracing::info!(
            reachable,
            total = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Warm-up complete"
        );
    }

    /// Runs one batched cycle over the fleet.
    ///
    /// Returns `false` if the running flag was cleared before the cycle
    /// finished.
    pub async fn run_cycle(&self) -> bool {
        self.cycle(self.inner.generation.load(Ordering::Acquire)).await
    }

    async fn cycle(&self, generation: u64) -> bool {
        let mut running = self.inner.running.subscribe();
        let started = Instant::now();
        let batch_size = self.inner.settings.effective_concurrency();
        if self.inner.nodes.is_empty() {
            return self.pause(&mut running).await;
        }

        for batch in self.inner.nodes.chunks(batch_size) {
            if !*running.borrow_and_update() || !self.is_current(generation) {
                return false;
            }
            join_all(batch.iter().map(|node| self.poll_node(node))).await;
            if !self.pause(&mut running).await {
                return false;
            }
        }

        tracing::info!(
            nodes = self.inner.nodes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Poll cycle complete"
        );
        true
    }

    /// Polls one node, then writes the store and publishes the new record.
    ///
    /// Never fails: poll errors become an unreachable record carrying the
    /// previous status and metrics.
    pub async fn poll_node(&self, node: &NodeDescriptor) -> NodeRecord {
        let started = Instant::now();
        let result = self
            .inner
            .executor
            .execute(node)
            .await
            .and_then(|output| Self::parse_output(node, &output));
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let record = match result {
            Ok(parsed) => {
                let health = classify(Some(&parsed.status));
                tracing::trace!(node = %node.name, %health, elapsed_ms, "Poll succeeded");
                self.inner.store.set(node, |record| {
                    record.apply_success(parsed.status, parsed.system, health, elapsed_ms);
                })
            }
            Err(err) => {
                tracing::debug!(
                    node = %node.name,
                    kind = err.kind(),
                    error = %err,
                    elapsed_ms,
                    "Poll failed"
                );
                self.inner
                    .store
                    .set(node, |record| record.apply_failure(err.to_string(), elapsed_ms))
            }
        };

        self.inner.broadcaster.publish(NODE_UPDATE_EVENT, &record);
        record
    }

    /// Parses executor output; output without usable status data is malformed
    fn parse_output(node: &NodeDescriptor, output: &str) -> PollResult<PollOutput> {
        if !OutputParser::has_status_evidence(node.kind, output) {
            let text = output.trim();
            let reason = if text.is_empty() { "no output" } else { text };
            return Err(PollError::MalformedOutput(reason.to_string()));
        }
        Ok(OutputParser::parse_poll_output(node.kind, output))
    }

    async fn run(&self, generation: u64) {
        if !self.inner.warmed_up.swap(true, Ordering::AcqRel) {
            self.warm_up().await;
        }
        while self.is_running() && self.is_current(generation) {
            if !self.cycle(generation).await {
                break;
            }
        }
        tracing::info!("Poller stopped");
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::Acquire) == generation
    }

    /// Sleeps for the poll interval; returns early with `false` on stop
    async fn pause(&self, running: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.inner.settings.poll_interval());
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => return *running.borrow(),
                changed = running.changed() => {
                    if changed.is_err() || !*running.borrow_and_update() {
                        return false;
                    }
                }
            }
        }
    }
}
