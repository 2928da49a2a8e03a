use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info};

/// Unique, monotonically assigned subscriber identity
pub type SubscriberId = u64;

/// Fixed tuning for one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTuning {
    /// Bytes pulled from the live pipe per broadcast chunk
    pub read_chunk_bytes: usize,
    /// Chunks buffered per subscriber before new chunks are dropped
    pub queue_depth: usize,
    /// Buffered writer capacity used by each delivery handler
    pub write_buffer_bytes: usize,
}

impl Default for StreamTuning {
    fn default() -> Self {
        Self {
            read_chunk_bytes: 4000,
            queue_depth: 10,
            write_buffer_bytes: 32768,
        }
    }
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers the chunk was queued for
    pub delivered: usize,
    /// Subscribers whose queue was full
    pub dropped: usize,
}

struct SubscriberSlot {
    tx: mpsc::Sender<Bytes>,
    closed: Arc<AtomicBool>,
}

struct RegistryInner {
    subscribers: RwLock<HashMap<SubscriberId, SubscriberSlot>>,
    next_id: AtomicU64,
    broadcast_total: AtomicU64,
    dropped_total: AtomicU64,
    tuning: StreamTuning,
}

impl RegistryInner {
    fn remove(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write();
        match subscribers.remove(&id) {
            Some(slot) => {
                slot.closed.store(true, Ordering::SeqCst);
                info!("Subscriber #{} removed. Remaining: {}", id, subscribers.len());
                true
            }
            None => false,
        }
    }
}

/// Subscriber directory with bounded, best-effort delivery
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct FanoutRegistry {
    inner: Arc<RegistryInner>,
}

impl FanoutRegistry {
    pub fn new(tuning: StreamTuning) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                broadcast_total: AtomicU64::new(0),
                dropped_total: AtomicU64::new(0),
                tuning,
            }),
        }
    }

    pub fn tuning(&self) -> StreamTuning {
        self.inner.tuning
    }

    /// Register a new subscriber with an empty queue
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.inner.tuning.queue_depth.max(1));
        let closed = Arc::new(AtomicBool::new(false));

        let mut subscribers = self.inner.subscribers.write();
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        subscribers.insert(
            id,
            SubscriberSlot {
                tx,
                closed: Arc::clone(&closed),
            },
        );
        info!("Subscriber #{} added. Total: {}", id, subscribers.len());

        Subscription {
            id,
            rx,
            closed,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Close and remove a subscriber's queue, discarding anything pending.
    ///
    /// Returns false if `id` was not registered; repeated calls are no-ops.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.remove(id)
    }

    /// Queue `chunk` for every subscriber without waiting
    ///
    /// A subscriber whose queue is full misses this chunk; nobody else is
    /// affected and the call never blocks.
    pub fn broadcast(&self, chunk: Bytes) -> BroadcastReport {
        let subscribers = self.inner.subscribers.read();
        let mut report = BroadcastReport::default();

        for (id, slot) in subscribers.iter() {
            match slot.tx.try_send(chunk.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!("Subscriber #{} queue full, chunk dropped", id);
                    report.dropped += 1;
                }
                // Receiver already gone; the drop guard is about to unsubscribe it
                Err(TrySendError::Closed(_)) => report.dropped += 1,
            }
        }

        self.inner.broadcast_total.fetch_add(1, Ordering::Relaxed);
        if report.dropped > 0 {
            self.inner
                .dropped_total
                .fetch_add(report.dropped as u64, Ordering::Relaxed);
        }

        report
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Chunks broadcast since the registry was created
    pub fn broadcast_total(&self) -> u64 {
        self.inner.broadcast_total.load(Ordering::Relaxed)
    }

    /// Chunks dropped across all subscribers since the registry was created
    pub fn dropped_total(&self) -> u64 {
        self.inner.dropped_total.load(Ordering::Relaxed)
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner.subscribers.read().contains_key(&id)
    }
}

/// One subscriber's end of the registry
///
/// Dropping it unsubscribes, so every exit path of a delivery handler
/// releases its registry slot.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Bytes>,
    closed: Arc<AtomicBool>,
    registry: Weak<RegistryInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next chunk. `None` once the subscription is closed or
    /// its registry is gone.
    pub async fn recv(&mut self) -> Option<Bytes> {
        if self.is_closed() {
            return None;
        }

        let chunk = self.rx.recv().await;
        if self.is_closed() {
            return None;
        }
        chunk
    }

    /// Take the next chunk if one is already queued
    pub fn try_recv(&mut self) -> Option<Bytes> {
        if self.is_closed() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// True if nothing is queued right now
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let tuning = StreamTuning::default();
        assert_eq!(tuning.read_chunk_bytes, 4000);
        assert_eq!(tuning.queue_depth, 10);
        assert_eq!(tuning.write_buffer_bytes, 32768);
    }

    #[test]
    fn test_identities_are_monotonic() {
        let registry = FanoutRegistry::new(StreamTuning::default());
        let a = registry.subscribe();
        let b = registry.subscribe();
        drop(a);
        let c = registry.subscribe();

        assert!(b.id() > 1);
        assert!(c.id() > b.id());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = FanoutRegistry::new(StreamTuning::default());
        let sub = registry.subscribe();
        let id = sub.id();
        assert!(registry.contains(id));

        drop(sub);
        assert!(!registry.contains(id));
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_discards_pending() {
        let registry = FanoutRegistry::new(StreamTuning::default());
        let mut sub = registry.subscribe();
        registry.broadcast(Bytes::from_static(b"pending"));

        assert!(registry.unsubscribe(sub.id()));
        assert!(sub.is_closed());
        assert_eq!(sub.try_recv(), None);
    }
}
