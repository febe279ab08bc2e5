//! Bounded TTL cache keyed by INN.
//!
//! Entries expire `ttl` after they were last written. Expired entries are
//! never returned: `get` re-checks freshness on every read and drops what it
//! finds stale, and [`TtlCache::purge_expired`] sweeps the rest. When a new
//! key would push the cache past its capacity, the entry with the oldest
//! write is evicted. Writes are ordered by a monotonic sequence number, so
//! two writes within the same clock tick still have a strict order.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{Clock, StoreError, SystemClock};

struct Entry<V> {
    value: V,
    stored_at: Instant,
    seq: u64,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// Write sequence → key, oldest first.
    order: BTreeMap<u64, K>,
    next_seq: u64,
}

impl<K: Eq + Hash + Clone, V> Inner<K, V> {
    fn remove(&mut self, key: &K) -> Option<Entry<V>> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }

    fn purge_expired(&mut self, now: Instant, ttl: Duration) -> usize {
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, e)| is_expired(e.stored_at, now, ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }
}

fn is_expired(stored_at: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(stored_at) >= ttl
}

/// Thread-safe, capacity-bounded cache with per-entry expiry.
///
/// All operations take `&self`; share the cache behind an [`Arc`].
pub struct TtlCache<K, V> {
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Create a cache reading the system's monotonic clock.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self, StoreError> {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`.
    pub fn with_clock(
        capacity: usize,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        if ttl.is_zero() {
            return Err(StoreError::InvalidTtl(ttl));
        }
        Ok(Self {
            capacity,
            ttl,
            clock,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: BTreeMap::new(),
                next_seq: 0,
            }),
        })
    }

    // A panic while holding the lock cannot leave `Inner` half-updated in a
    // way later calls would misread, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch a live entry. An expired entry is removed and reported absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut inner = self.lock();
        let stored_at = inner.entries.get(key)?.stored_at;
        if is_expired(stored_at, now, self.ttl) {
            debug!(key = ?key, "cache entry expired");
            inner.remove(key);
            return None;
        }
        inner.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert or refresh `key`. Returns the key evicted to make room, if any.
    ///
    /// Refreshing an existing key replaces its value and timestamp and never
    /// evicts another entry.
    pub fn put(&self, key: K, value: V) -> Option<K> {
        let now = self.clock.now();
        let mut inner = self.lock();
        let mut evicted = None;

        if inner.remove(&key).is_none() && inner.entries.len() >= self.capacity {
            inner.purge_expired(now, self.ttl);
            if inner.entries.len() >= self.capacity {
                evicted = inner.evict_oldest();
                debug!(evicted = ?evicted, "cache full, evicted oldest entry");
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.order.insert(seq, key.clone());
        inner.entries.insert(
            key,
            Entry {
                value,
                stored_at: now,
                seq,
            },
        );
        evicted
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let purged = self.lock().purge_expired(now, self.ttl);
        if purged > 0 {
            debug!(purged, "purged expired cache entries");
        }
        purged
    }

    /// Number of live entries. Expired entries are skipped, not removed.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.lock()
            .entries
            .values()
            .filter(|e| !is_expired(e.stored_at, now, self.ttl))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live entry exists for `key`, without cloning it.
    pub fn contains(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.lock()
            .entries
            .get(key)
            .is_some_and(|e| !is_expired(e.stored_at, now, self.ttl))
    }
}
