//! Generic in-memory cache with per-entry TTL.
//!
//! Reads take a shared lock and never block other readers. Expiry is
//! enforced twice: `get` re-validates the TTL at read time, and a
//! background sweeper periodically removes entries that have physically
//! expired. An expired-but-not-yet-swept entry is treated as absent.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock, Weak};
use std::time::{Duration, Instant};

/// A stored value with its creation timestamp and TTL.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) > self.ttl
    }
}

/// Time-keyed TTL cache.
///
/// Many concurrent readers, occasional writers; protected by a
/// read-write lock.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a value if present and not expired.
    ///
    /// The TTL is checked at read time, so a value is never returned more
    /// than its TTL after insertion, whether or not the sweeper has run.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Insert a value with the given TTL, replacing any previous entry.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Remove a single entry.
    pub fn delete(&self, key: &K) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Number of physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// True if no entries are physically stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all physically expired entries.
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| !entry.is_expired(now));
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Spawn a background task sweeping expired entries on a fixed period.
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped, so the sweep period is independent of read/write traffic.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                match cache.upgrade() {
                    Some(cache) => cache.sweep(),
                    None => break,
                }
            }
        })
    }
}
