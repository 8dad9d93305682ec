//! Result cache: bounded, thread-safe, least-recently-used.
//!
//! The lookup pipeline calls the engine once per candidate substring of the
//! user's text, so the same inputs recur constantly while a user reads. The
//! cache maps an exact input text to its *full* result set; entries are
//! complete or absent, never partially invalidated.
//!
//! A single mutex guards the LRU structure. Every call is short-lived (the
//! engine's termination guards bound work by input length), so contention is
//! the cheap kind: concurrent lookups for the same missing text may both
//! recompute, which is idempotent and acceptable.

use crate::form::Form;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

/// Default cache capacity in entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Statistics about cache performance.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits (successful lookups).
    pub hits: u64,
    /// Number of cache misses (failed lookups).
    pub misses: u64,
    /// Number of entries evicted due to the capacity limit.
    pub evictions: u64,
    /// Current number of entries in the cache.
    pub current_size: usize,
    /// Maximum capacity of the cache.
    pub capacity: usize,
}

impl CacheStats {
    /// Cache hit rate in `0.0..=1.0`; `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }
}

struct CacheInner {
    entries: LruCache<String, Vec<Form>>,
    stats: CacheStats,
}

/// Thread-safe LRU over full deconjugation result sets.
pub(crate) struct ResultCache {
    inner: Mutex<CacheInner>,
}

impl ResultCache {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ResultCache {
            inner: Mutex::new(CacheInner {
                entries: LruCache::new(NonZeroUsize::new(capacity).expect("capacity is clamped to >= 1")),
                stats: CacheStats { capacity, ..CacheStats::default() },
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        // A poisoned cache only means a panic elsewhere mid-insert; the LRU
        // itself is never left in a torn state, so keep serving.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `text`, marking it most recently used on a hit.
    pub(crate) fn get(&self, text: &str) -> Option<Vec<Form>> {
        let mut inner = self.lock();
        match inner.entries.get(text) {
            Some(forms) => {
                let forms = forms.clone();
                inner.stats.hits += 1;
                Some(forms)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store a full result set under `text`, evicting the least recently
    /// used entry when at capacity.
    pub(crate) fn put(&self, text: &str, forms: Vec<Form>) {
        let mut inner = self.lock();
        if let Some((evicted_key, _)) = inner.entries.push(text.to_string(), forms) {
            // push returns the displaced entry; if its key differs from the
            // inserted one, a capacity eviction happened (otherwise it was a
            // same-key replacement).
            if evicted_key != text {
                inner.stats.evictions += 1;
            }
        }
        let len = inner.entries.len();
        inner.stats.current_size = len;
    }

    pub(crate) fn contains(&self, text: &str) -> bool {
        // peek: membership probes must not disturb recency order.
        self.lock().entries.peek(text).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.lock().stats.capacity
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    pub(crate) fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.stats.current_size = 0;
        // Hits/misses/evictions are cumulative and survive a clear.
    }
}
