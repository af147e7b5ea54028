//! Advisory in-process dedup cache for processed webhook events.
//!
//! Keyed by `paymentId:eventType`. This is a fast-path optimization that
//! short-circuits obvious replays within a short window; it is lost on
//! restart and may evict under pressure. Correctness does not depend on it -
//! the UNIQUE constraint on `payment_transactions.payment_id` is the durable
//! backstop.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    pub received_at: i64,
}

struct Inner {
    entries: HashMap<String, ProcessedEvent>,
    /// Insertion order, oldest first. Drives batch eviction.
    order: VecDeque<String>,
}

/// Bounded, concurrency-safe processed-event index.
///
/// On overflow the oldest tenth of the capacity is evicted in one batch
/// rather than tracking strict LRU per insert.
pub struct EventCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl EventCache {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "event cache capacity must be non-zero");
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
            capacity,
        }
    }

    fn key(payment_id: &str, event_type: &str) -> String {
        format!("{}:{}", payment_id, event_type)
    }

    /// Whether this (payment, event) pair was seen recently. `false` does not
    /// guarantee the event is new.
    pub fn is_processed(&self, payment_id: &str, event_type: &str) -> bool {
        self.lock().entries.contains_key(&Self::key(payment_id, event_type))
    }

    pub fn mark_processed(&self, payment_id: &str, event_type: &str) {
        let key = Self::key(payment_id, event_type);
        let record = ProcessedEvent {
            received_at: chrono::Utc::now().timestamp(),
        };

        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), record).is_none() {
            inner.order.push_back(key);
        }

        if inner.entries.len() > self.capacity {
            let batch = (self.capacity / 10).max(1);
            for _ in 0..batch {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.entries.remove(&oldest);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // The cache is advisory, so a panic mid-insert leaves nothing worth
        // invalidating; recover the guard instead of poisoning the process.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EventCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
