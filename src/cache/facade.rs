//! Cache Façade Module
//!
//! Public cache API: typed values in, encoded bytes in the sharded store, TTL
//! decisions against an injected clock, and glob-pattern invalidation.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::expiry::{Clock, SystemClock, Ttl};
use crate::cache::store::{EntryStore, Lookup, ScanCursor};
use crate::cache::{
    CacheStats, Codec, GlobPattern, JsonCodec, StatsRecorder, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::error::{CacheError, Result};

/// Headroom over the starting key count that a pattern scan may consume.
const SCAN_ITERATION_FACTOR: usize = 4;

// == Cache Config ==
/// Tuning knobs for a [`Cache`] instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied by `set` when the caller does not pick one
    pub default_ttl: Duration,
    /// Number of lock shards (rounded up to a power of two)
    pub shard_count: usize,
    /// Entries visited per batch during pattern deletes
    pub scan_batch_size: usize,
    /// Entries examined per lock acquisition during expiry sweeps
    pub sweep_batch_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            shard_count: 16,
            scan_batch_size: 100,
            sweep_batch_size: 256,
        }
    }
}

impl CacheConfig {
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_shard_count(mut self, shards: usize) -> Self {
        self.shard_count = shards;
        self
    }

    pub fn with_scan_batch_size(mut self, batch: usize) -> Self {
        self.scan_batch_size = batch.max(1);
        self
    }

    pub fn with_sweep_batch_size(mut self, batch: usize) -> Self {
        self.sweep_batch_size = batch.max(1);
        self
    }
}

// == Cache Operations ==
/// The six cache operations callers depend on.
pub trait CacheOps {
    /// Returns the decoded value, or `None` on a miss. Corrupted entries are
    /// evicted and reported as a miss.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;

    /// Stores a value with the default TTL.
    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    fn del(&self, key: &str) -> bool;

    /// Same as [`CacheOps::del`].
    fn clear_cache(&self, key: &str) -> bool;

    /// Removes every entry, returning how many were held.
    fn flush_all(&self) -> usize;

    /// Removes every live key matching a glob pattern, returning how many were removed.
    fn del_by_pattern(&self, pattern: &str) -> Result<usize>;
}

struct CacheInner<C> {
    store: EntryStore,
    codec: C,
    clock: Arc<dyn Clock>,
    stats: StatsRecorder,
    config: CacheConfig,
}

// == Cache ==
/// In-process cache handle. Clones share the same storage.
pub struct Cache<C: Codec = JsonCodec> {
    inner: Arc<CacheInner<C>>,
}

impl<C: Codec> Clone for Cache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Codec> std::fmt::Debug for Cache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.inner.config)
            .field("entries", &self.inner.store.len())
            .finish()
    }
}

impl Cache<JsonCodec> {
    // == Constructor ==
    /// Creates a JSON-backed cache on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_parts(config, JsonCodec, Arc::new(SystemClock))
    }
}

impl Default for Cache<JsonCodec> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<C: Codec> Cache<C> {
    /// Creates a cache with an explicit codec and clock.
    pub fn with_parts(config: CacheConfig, codec: C, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store: EntryStore::new(config.shard_count),
                codec,
                clock,
                stats: StatsRecorder::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    fn now(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        Ok(())
    }

    // == Try Get ==
    /// Like `get`, but reports corrupted entries as `CacheError::Deserialization`
    /// after evicting them.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Self::validate_key(key)?;
        let inner = &self.inner;

        let bytes = match inner.store.get(key, self.now()) {
            Lookup::Hit(bytes) => bytes,
            Lookup::Missing => {
                inner.stats.record_miss();
                debug!(op = "get", key, outcome = "miss");
                return Ok(None);
            }
            Lookup::Expired => {
                inner.stats.record_miss();
                inner.stats.record_expired(1);
                debug!(op = "get", key, outcome = "expired");
                return Ok(None);
            }
        };

        match inner.codec.decode(&bytes) {
            Ok(value) => {
                inner.stats.record_hit();
                debug!(op = "get", key, outcome = "hit");
                Ok(Some(value))
            }
            Err(e) => {
                // Only drop the bytes we failed on, not a value written since
                if inner.store.remove_if_value(key, &bytes) {
                    inner.stats.record_corrupted();
                }
                inner.stats.record_miss();
                warn!(op = "get", key, outcome = "corrupted", error = %e, "Evicted undecodable entry");
                Err(CacheError::Deserialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    // == Set With TTL ==
    /// Stores a value with an explicit TTL. `Ttl::After(Duration::ZERO)` leaves the
    /// key absent.
    pub fn set_with_ttl<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Ttl) -> Result<()> {
        Self::validate_key(key)?;

        let bytes = self.inner.codec.encode(value).map_err(|e| {
            warn!(op = "set", key, outcome = "unencodable", error = %e);
            CacheError::Serialization(e.to_string())
        })?;

        if bytes.len() > MAX_VALUE_SIZE {
            return Err(CacheError::ValueTooLarge {
                size: bytes.len(),
                max: MAX_VALUE_SIZE,
            });
        }

        self.inner
            .store
            .put(key.to_string(), bytes, ttl, self.now());
        self.inner.stats.record_set();
        debug!(op = "set", key, ?ttl, outcome = "stored");
        Ok(())
    }

    // == Inspection ==
    /// True if the key currently holds a live entry.
    pub fn exists(&self, key: &str) -> bool {
        self.inner.store.ttl_remaining(key, self.now()).is_some()
    }

    /// Remaining lifetime of a live key: `None` if absent, `Some(Ttl::Never)` if it
    /// never expires.
    pub fn ttl(&self, key: &str) -> Option<Ttl> {
        self.inner
            .store
            .ttl_remaining(key, self.now())
            .map(|remaining| remaining.map_or(Ttl::Never, Ttl::After))
    }

    /// Snapshot of all live keys.
    pub fn keys(&self) -> Vec<String> {
        self.inner.store.list_keys(self.now())
    }

    /// Live keys matching a glob pattern, gathered with the same batched scan as
    /// [`CacheOps::del_by_pattern`].
    pub fn keys_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let glob = GlobPattern::compile(pattern)?;
        let mut keys = Vec::new();
        self.scan_matching("keys_matching", &glob, |page| keys.extend(page));
        Ok(keys)
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.inner.store.len())
    }

    // == Pattern Scan ==
    /// Scans in batches of `scan_batch_size` and hands every non-empty page of live
    /// matching keys to `on_page`. Returns the number of scan calls made.
    ///
    /// The loop is capped at `SCAN_ITERATION_FACTOR` times the calls needed for the
    /// entries present at the start, so keys written during the scan cannot keep it
    /// alive forever.
    fn scan_matching<F>(&self, op: &'static str, glob: &GlobPattern, mut on_page: F) -> usize
    where
        F: FnMut(Vec<String>),
    {
        let store = &self.inner.store;
        let batch = self.inner.config.scan_batch_size.max(1);
        let max_iterations =
            (store.len() / batch + store.shard_count() + 1) * SCAN_ITERATION_FACTOR;
        let match_all = glob.is_match_all();

        let mut cursor = ScanCursor::start();
        let mut iterations = 0;

        loop {
            let page = store.scan(&cursor, batch, self.now(), |k| {
                match_all || glob.matches(k)
            });
            iterations += 1;

            if !page.keys.is_empty() {
                on_page(page.keys);
            }
            if page.next.is_complete() {
                break;
            }
            if iterations >= max_iterations {
                warn!(
                    op,
                    pattern = glob.as_str(),
                    iterations,
                    "Scan stopped at iteration cap"
                );
                break;
            }
            cursor = page.next;
        }

        iterations
    }

    // == Evict Expired ==
    /// Reclaims every expired entry now, in sweep-sized batches.
    pub fn evict_expired(&self) -> usize {
        let removed = self
            .inner
            .store
            .evict_expired(self.now(), self.inner.config.sweep_batch_size);
        self.inner.stats.record_expired(removed);
        removed
    }
}

impl<C: Codec> CacheOps for Cache<C> {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.try_get(key) {
            Err(CacheError::Deserialization { .. }) => Ok(None),
            other => other,
        }
    }

    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set_with_ttl(key, value, Ttl::After(self.inner.config.default_ttl))
    }

    fn del(&self, key: &str) -> bool {
        let removed = self.inner.store.remove(key);
        if removed {
            self.inner.stats.record_deletes(1);
        }
        debug!(op = "del", key, removed);
        removed
    }

    fn clear_cache(&self, key: &str) -> bool {
        self.del(key)
    }

    fn flush_all(&self) -> usize {
        let removed = self.inner.store.remove_everything();
        self.inner.stats.record_deletes(removed);
        debug!(op = "flush_all", removed);
        removed
    }

    // == Delete By Pattern ==
    /// Removes matching keys page by page as the scan yields them.
    fn del_by_pattern(&self, pattern: &str) -> Result<usize> {
        let glob = GlobPattern::compile(pattern).map_err(|e| {
            warn!(op = "del_by_pattern", pattern, outcome = "invalid_pattern", error = %e);
            CacheError::from(e)
        })?;

        let store = &self.inner.store;
        let mut removed = 0;
        let iterations = self.scan_matching("del_by_pattern", &glob, |page| {
            removed += store.remove_all(page);
        });

        self.inner.stats.record_deletes(removed);
        debug!(op = "del_by_pattern", pattern, removed, iterations);
        Ok(removed)
    }
}
