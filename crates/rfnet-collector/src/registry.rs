//! Live subscriber registry and broadcast.
//!
//! Every registered connection owns a bounded outbound queue. `register`,
//! `deregister` and `broadcast` all run under one mutex around the handle
//! map. Broadcast only does non-blocking `try_send` inside the critical
//! section, so the lock is held for O(subscribers) queue pushes and never
//! across socket I/O.
//!
//! A subscriber whose queue is full or closed is removed during the broadcast
//! that found it failing and its connection is cancelled. Other subscribers
//! are unaffected.

use parking_lot::Mutex;
use rfnet_telemetry::Metrics;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Opaque per-connection handle id.
pub type SubscriberId = u64;

/// Broadcast payload, shared by all queues.
pub type Payload = Arc<str>;

/// Registry side of one subscriber.
struct SubscriberHandle {
    tx: mpsc::Sender<Payload>,
    closed: CancellationToken,
}

/// Connection side of one subscriber, returned by [`SubscriberRegistry::register`].
pub struct Subscription {
    pub id: SubscriberId,
    /// Payloads to forward to the connection.
    pub rx: mpsc::Receiver<Payload>,
    /// Cancelled when the registry drops this subscriber or shuts down.
    pub closed: CancellationToken,
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Registry of live real-time subscribers.
pub struct SubscriberRegistry {
    subscribers: Mutex<HashMap<SubscriberId, SubscriberHandle>>,
    next_id: AtomicU64,
    queue_capacity: usize,
}

impl SubscriberRegistry {
    /// Create a registry whose subscribers buffer up to `queue_capacity` payloads.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Add a subscriber with no limit on the registry size.
    pub fn register(&self) -> Subscription {
        let mut subscribers = self.subscribers.lock();
        self.insert_locked(&mut subscribers)
    }

    /// Add a subscriber unless `max` are already registered.
    ///
    /// The check and the insert happen under the same lock, so concurrent
    /// callers cannot push the registry past `max`.
    pub fn try_register(&self, max: usize) -> Option<Subscription> {
        let mut subscribers = self.subscribers.lock();
        if subscribers.len() >= max {
            return None;
        }
        Some(self.insert_locked(&mut subscribers))
    }

    fn insert_locked(&self, subscribers: &mut HashMap<SubscriberId, SubscriberHandle>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let closed = CancellationToken::new();

        subscribers.insert(
            id,
            SubscriberHandle {
                tx,
                closed: closed.clone(),
            },
        );
        let count = subscribers.len();
        Metrics::subscribers_set(count);
        info!(subscriber = id, subscribers = count, "Subscriber registered");

        Subscription { id, rx, closed }
    }

    /// Remove a subscriber on normal disconnect.
    ///
    /// Returns false if it was already gone (e.g. dropped by a broadcast).
    pub fn deregister(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut subscribers = self.subscribers.lock();
            let removed = subscribers.remove(&id);
            (removed, subscribers.len())
        };
        Metrics::subscribers_set(count);

        match removed {
            Some(handle) => {
                handle.closed.cancel();
                info!(subscriber = id, subscribers = count, "Subscriber deregistered");
                true
            }
            None => false,
        }
    }

    /// Queue `payload` for every registered subscriber.
    ///
    /// Each subscriber is visited once. Those that cannot accept the payload
    /// are removed and their connection cancelled; they are not retried.
    pub fn broadcast(&self, payload: Payload) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        let count = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|id, handle| match handle.tx.try_send(payload.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(e) => {
                    let reason = match e {
                        TrySendError::Full(_) => "full",
                        TrySendError::Closed(_) => "closed",
                    };
                    handle.closed.cancel();
                    report.dropped += 1;
                    Metrics::subscriber_dropped(reason);
                    debug!(subscriber = *id, reason, "Dropping subscriber");
                    false
                }
            });
            subscribers.len()
        };

        Metrics::broadcast_fanout(report.delivered);
        if report.dropped > 0 {
            Metrics::subscribers_set(count);
            info!(
                dropped = report.dropped,
                subscribers = count,
                "Dropped failing subscribers"
            );
        }
        report
    }

    /// Cancel and remove every subscriber (server shutdown).
    pub fn close_all(&self) {
        let drained: Vec<_> = self.subscribers.lock().drain().collect();
        for (_, handle) in &drained {
            handle.closed.cancel();
        }
        Metrics::subscribers_set(0);
        if !drained.is_empty() {
            info!(closed = drained.len(), "Closed all subscribers");
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
