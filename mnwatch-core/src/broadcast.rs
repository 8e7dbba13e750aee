//! Fan-out of node updates to live subscribers
//!
//! Every subscriber owns a bounded channel of [`Frame`]s. Publishing never
//! blocks: a subscriber whose channel is closed or full is dropped from the
//! registry on the spot. A keepalive comment goes out on a fixed interval so
//! idle streams survive proxies; the timer starts with the first subscriber
//! and is stopped by [`Broadcaster::shutdown`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{BroadcastError, BroadcastResult};

/// Default live-subscriber ceiling
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 100;

/// Default keepalive interval
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(30);

/// Default per-subscriber channel capacity
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Text of the periodic keepalive comment
pub const KEEPALIVE_COMMENT: &str = "keepalive";

/// One unit written to a subscriber stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Comment line, ignored by event-stream clients
    Comment(String),
    /// Named event carrying a JSON payload
    Event {
        /// Event name (e.g. `nodeUpdate`)
        name: String,
        /// Serialized JSON payload
        data: String,
    },
}

impl Frame {
    /// Renders the frame in `text/event-stream` wire format
    #[must_use]
    pub fn to_sse(&self) -> String {
        match self {
            Self::Comment(text) => format!(":{text}\n\n"),
            Self::Event { name, data } => format!("event: {name}\ndata: {data}\n\n"),
        }
    }
}

/// Accepted subscription: its id and the frames to forward to the client.
///
/// Dropping `frames` (client went away) deregisters the subscriber.
#[derive(Debug)]
pub struct Subscription {
    /// Registry id, usable with [`Broadcaster::unsubscribe`]
    pub id: u64,
    /// Stream of frames for this subscriber
    pub frames: mpsc::Receiver<Frame>,
}

#[derive(Debug)]
struct Subscriber {
    tx: mpsc::Sender<Frame>,
    watcher: JoinHandle<()>,
}

#[derive(Debug)]
struct Inner {
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_id: AtomicU64,
    max_subscribers: usize,
    buffer: usize,
    keepalive_every: Duration,
    keepalive_task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Inner {
    fn remove(&self, id: u64) -> bool {
        let removed = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(subscriber) => {
                subscriber.watcher.abort();
                tracing::debug!(subscriber = id, "Subscriber removed");
                true
            }
            None => false,
        }
    }

    /// Writes `frame` to every subscriber, dropping the ones that refuse it
    fn fan_out(&self, frame: &Frame) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut delivered = 0;
        subscribers.retain(|id, subscriber| {
            if subscriber.tx.try_send(frame.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                tracing::debug!(subscriber = id, "Dropping subscriber after failed write");
                subscriber.watcher.abort();
                false
            }
        });
        delivered
    }
}

/// Registry of live subscribers; clones share the same registry
#[derive(Debug, Clone)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUBSCRIBERS, DEFAULT_KEEPALIVE, DEFAULT_SUBSCRIBER_BUFFER)
    }
}

impl Broadcaster {
    /// Creates a broadcaster.
    ///
    /// `buffer` is the per-subscriber channel capacity (at least 1).
    #[must_use]
    pub fn new(max_subscribers: usize, keepalive_every: Duration, buffer: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                max_subscribers,
                buffer: buffer.max(1),
                keepalive_every,
                keepalive_task: Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Registers a new subscriber.
    ///
    /// The returned channel already holds an empty comment frame that opens
    /// the stream. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`BroadcastError::CapacityReached`] when the ceiling is reached (the
    /// caller is not registered), [`BroadcastError::Closed`] after shutdown.
    pub fn subscribe(&self) -> BroadcastResult<Subscription> {
        if self.is_closed() {
            return Err(BroadcastError::Closed);
        }

        let (tx, frames) = mpsc::channel(self.inner.buffer);
        let id = {
            let mut subscribers = self
                .inner
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if subscribers.len() >= self.inner.max_subscribers {
                tracing::warn!(
                    limit = self.inner.max_subscribers,
                    "Rejecting subscriber: capacity reached"
                );
                return Err(BroadcastError::CapacityReached {
                    limit: self.inner.max_subscribers,
                });
            }

            // Fresh channel with capacity >= 1, cannot fail
            let _ = tx.try_send(Frame::Comment(String::new()));

            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            let watcher = Self::spawn_disconnect_watcher(&self.inner, id, tx.clone());
            subscribers.insert(id, Subscriber { tx, watcher });
            id
        };

        tracing::debug!(subscriber = id, "Subscriber registered");
        self.ensure_keepalive();
        Ok(Subscription { id, frames })
    }

    /// Removes a subscriber; returns `false` if it was not registered
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.inner.remove(id)
    }

    /// Serializes `payload` once and sends it as event `event` to every
    /// subscriber.
    ///
    /// Returns the number of subscribers that accepted the frame. Failed
    /// writes deregister the subscriber and are not reported.
    pub fn publish<T: Serialize + ?Sized>(&self, event: &str, payload: &T) -> usize {
        let data = match serde_json::to_string(payload) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(event, error = %e, "Failed to serialize event payload");
                return 0;
            }
        };
        self.inner.fan_out(&Frame::Event {
            name: event.to_string(),
            data,
        })
    }

    /// Sends the keepalive comment to every subscriber
    pub fn keepalive(&self) -> usize {
        self.inner.fan_out(&Frame::Comment(KEEPALIVE_COMMENT.to_string()))
    }

    /// Number of registered subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether [`Self::shutdown`] has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stops the keepalive timer and closes every subscriber stream.
    ///
    /// Later subscriptions are rejected with [`BroadcastError::Closed`].
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        if let Some(task) = self
            .inner
            .keepalive_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }

        let drained: Vec<Subscriber> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, subscriber)| subscriber)
            .collect();
        let count = drained.len();
        for subscriber in drained {
            subscriber.watcher.abort();
        }
        tracing::info!(closed = count, "Broadcaster shut down");
    }

    fn spawn_disconnect_watcher(inner: &Arc<Inner>, id: u64, tx: mpsc::Sender<Frame>) -> JoinHandle<()> {
        let inner = Arc::downgrade(inner);
        tokio::spawn(async move {
            tx.closed().await;
            drop(tx);
            if let Some(inner) = inner.upgrade() {
                inner.remove(id);
            }
        })
    }

    fn ensure_keepalive(&self) {
        let mut task = self
            .inner
            .keepalive_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if task.is_some() || self.is_closed() {
            return;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let every = self.inner.keepalive_every;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // First tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let delivered = Self { inner }.keepalive();
                tracing::trace!(delivered, "Keepalive sent");
            }
        }));
        tracing::debug!(interval = ?every, "Keepalive timer started");
    }
}
