//! Per-key fetch cache with single-flight semantics.
//!
//! Each key moves through `absent → Pending → Ready | Failed`. A key
//! that is `Pending` or `Ready` is never fetched again; a `Failed` key
//! keeps its error message and may be retried. There is no
//! invalidation: once `Ready`, an entry stays for the cache's lifetime.
//!
//! The cache is synchronous. Callers hold it behind a lock, call
//! [`RecordCache::begin`] to claim a fetch, release the lock for the
//! request, then [`RecordCache::resolve`] with the result.

use std::collections::HashMap;
use std::hash::Hash;

// ═══════════════════════════════════════════════════════════
// CacheEntry — state of one key
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry<V> {
    /// A fetch is in flight for this key.
    Pending,
    Ready(V),
    /// Last fetch failed. Data stays absent so a later call can retry.
    Failed(String),
}

/// What the caller of [`RecordCache::begin`] should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Begin<V> {
    /// Caller owns the fetch and must call `resolve`.
    Fetch,
    /// Another caller is already fetching this key.
    InFlight,
    Cached(V),
}

// ═══════════════════════════════════════════════════════════
// RecordCache
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct RecordCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> RecordCache<K, V>
where
    K: Eq + Hash + Copy + std::fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    // ── Fetch protocol ───────────────────────────────────

    /// Claim the fetch for `key` unless it is cached or already in flight.
    /// Claiming clears any previous error for the key.
    pub fn begin(&mut self, key: K) -> Begin<V> {
        match self.entries.get(&key) {
            Some(CacheEntry::Ready(v)) => Begin::Cached(v.clone()),
            Some(CacheEntry::Pending) => Begin::InFlight,
            Some(CacheEntry::Failed(_)) | None => {
                self.entries.insert(key, CacheEntry::Pending);
                Begin::Fetch
            }
        }
    }

    /// Store the outcome of a fetch claimed with [`begin`](Self::begin).
    pub fn resolve(&mut self, key: K, outcome: Result<V, String>) {
        let entry = match outcome {
            Ok(v) => CacheEntry::Ready(v),
            Err(message) => {
                tracing::warn!(key = ?key, error = %message, "Cached fetch failed");
                CacheEntry::Failed(message)
            }
        };
        self.entries.insert(key, entry);
    }

    // ── Per-key view ─────────────────────────────────────

    pub fn entry(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self, key: &K) -> bool {
        matches!(self.entries.get(key), Some(CacheEntry::Pending))
    }

    pub fn error(&self, key: &K) -> Option<&str> {
        match self.entries.get(key) {
            Some(CacheEntry::Failed(message)) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Number of keys holding data.
    pub fn ready_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for RecordCache<K, V>
where
    K: Eq + Hash + Copy + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
