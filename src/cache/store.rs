//! Entry Store Module
//!
//! Sharded key-value storage. Every key hashes to exactly one shard, and each shard
//! is an ordered map behind its own read-write lock, so unrelated keys rarely contend
//! and scans can resume from the last key they visited.

use std::collections::hash_map::RandomState;
use std::collections::BTreeMap;
use std::hash::BuildHasher;
use std::ops::Bound;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::expiry::Ttl;
use crate::cache::CacheEntry;

type Shard = RwLock<BTreeMap<String, CacheEntry>>;

// == Lookup ==
/// Outcome of a point read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Live entry found
    Hit(Vec<u8>),
    /// Key was never set or has been removed
    Missing,
    /// Entry had expired and was evicted by this read
    Expired,
}

// == Scan Cursor ==
/// Opaque position in a resumable scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor(CursorState);

#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    Start,
    At { shard: usize, after: Option<String> },
    Complete,
}

impl ScanCursor {
    /// Cursor for the first call of a scan.
    pub fn start() -> Self {
        ScanCursor(CursorState::Start)
    }

    /// True once the whole key space has been visited.
    pub fn is_complete(&self) -> bool {
        self.0 == CursorState::Complete
    }
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self::start()
    }
}

/// One batch of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Live keys in this batch that passed the filter
    pub keys: Vec<String>,
    /// Where the next call resumes; complete when the scan is over
    pub next: ScanCursor,
}

// == Entry Store ==
/// Sharded, lock-per-shard storage of encoded entries.
///
/// The store never reads the clock itself; callers pass `now_ms` so liveness is
/// decided against whatever clock the owning cache uses.
#[derive(Debug)]
pub struct EntryStore {
    shards: Box<[Shard]>,
    hasher: RandomState,
}

impl EntryStore {
    // == Constructor ==
    /// Creates a store with `shard_count` shards, rounded up to a power of two.
    pub fn new(shard_count: usize) -> Self {
        let count = shard_count.max(1).next_power_of_two();
        let shards = (0..count)
            .map(|_| RwLock::new(BTreeMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, key: &str) -> usize {
        (self.hasher.hash_one(key) as usize) & (self.shards.len() - 1)
    }

    fn shard(&self, key: &str) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    // == Get ==
    /// Reads a key, evicting it if its TTL has elapsed.
    pub fn get(&self, key: &str, now_ms: u64) -> Lookup {
        let shard = self.shard(key);
        {
            let guard = shard.read();
            match guard.get(key) {
                None => return Lookup::Missing,
                Some(entry) if !entry.is_expired(now_ms) => return Lookup::Hit(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent put may have refreshed it
        let mut guard = shard.write();
        match guard.get(key) {
            None => Lookup::Missing,
            Some(entry) if !entry.is_expired(now_ms) => Lookup::Hit(entry.value.clone()),
            Some(_) => {
                guard.remove(key);
                Lookup::Expired
            }
        }
    }

    // == Put ==
    /// Stores a value, replacing any previous entry for the key.
    ///
    /// A zero TTL leaves the key absent.
    pub fn put(&self, key: String, value: Vec<u8>, ttl: Ttl, now_ms: u64) {
        let mut guard = self.shard(&key).write();
        if ttl.is_immediate() {
            guard.remove(&key);
        } else {
            guard.insert(key, CacheEntry::new(value, ttl, now_ms));
        }
    }

    // == Remove ==
    /// Removes a key. Returns whether an entry was present.
    pub fn remove(&self, key: &str) -> bool {
        self.shard(key).write().remove(key).is_some()
    }

    /// Removes a key only if it still holds exactly `value`.
    pub fn remove_if_value(&self, key: &str, value: &[u8]) -> bool {
        let mut guard = self.shard(key).write();
        if guard.get(key).is_some_and(|entry| entry.value == value) {
            guard.remove(key);
            true
        } else {
            false
        }
    }

    /// Removes a set of keys, taking each shard lock once. Returns how many were present.
    pub fn remove_all<I, S>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_shard: Vec<Vec<S>> = (0..self.shards.len()).map(|_| Vec::new()).collect();
        for key in keys {
            let idx = self.shard_index(key.as_ref());
            by_shard[idx].push(key);
        }

        by_shard
            .into_iter()
            .enumerate()
            .filter(|(_, keys)| !keys.is_empty())
            .map(|(idx, keys)| {
                let mut guard = self.shards[idx].write();
                keys.iter()
                    .filter(|key| {
                        let key: &str = (*key).as_ref();
                        guard.remove(key).is_some()
                    })
                    .count()
            })
            .sum()
    }

    /// Empties every shard, one at a time. Returns how many entries were dropped.
    pub fn remove_everything(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                let mut guard = shard.write();
                let count = guard.len();
                guard.clear();
                count
            })
            .sum()
    }

    // == Inspection ==
    /// Snapshot of live keys, collected shard by shard.
    pub fn list_keys(&self, now_ms: u64) -> Vec<String> {
        let mut keys = Vec::new();
        for shard in self.shards.iter() {
            let guard = shard.read();
            keys.extend(
                guard
                    .iter()
                    .filter(|(_, entry)| !entry.is_expired(now_ms))
                    .map(|(key, _)| key.clone()),
            );
        }
        keys
    }

    /// Remaining TTL of a live key. `None` if absent or expired, `Some(None)` if it
    /// never expires.
    pub fn ttl_remaining(&self, key: &str, now_ms: u64) -> Option<Option<Duration>> {
        let guard = self.shard(key).read();
        guard
            .get(key)
            .filter(|entry| !entry.is_expired(now_ms))
            .map(|entry| entry.ttl_remaining(now_ms))
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }

    // == Scan ==
    /// Visits at most `count` entries starting at `cursor` and returns the live keys
    /// among them that pass `filter`.
    ///
    /// Keys within a shard are visited in ascending order after the cursor position,
    /// so removing keys between calls never causes later keys to be skipped. Keys
    /// inserted behind the cursor during a scan are not visited.
    pub fn scan<F>(&self, cursor: &ScanCursor, count: usize, now_ms: u64, filter: F) -> ScanPage
    where
        F: Fn(&str) -> bool,
    {
        let count = count.max(1);
        let (mut shard_idx, mut after) = match &cursor.0 {
            CursorState::Start => (0, None),
            CursorState::At { shard, after } => (*shard, after.clone()),
            CursorState::Complete => {
                return ScanPage {
                    keys: Vec::new(),
                    next: ScanCursor(CursorState::Complete),
                }
            }
        };

        let mut keys = Vec::new();
        let mut visited = 0;

        while shard_idx < self.shards.len() {
            let guard = self.shards[shard_idx].read();
            let lower = match &after {
                Some(k) => Bound::Excluded(k.as_str()),
                None => Bound::Unbounded,
            };

            let mut last_seen: Option<&String> = None;
            for (key, entry) in guard.range::<str, _>((lower, Bound::Unbounded)) {
                if visited == count {
                    let after = last_seen.cloned().or_else(|| after.clone());
                    return ScanPage {
                        keys,
                        next: ScanCursor(CursorState::At {
                            shard: shard_idx,
                            after,
                        }),
                    };
                }
                visited += 1;
                last_seen = Some(key);
                if !entry.is_expired(now_ms) && filter(key) {
                    keys.push(key.clone());
                }
            }

            drop(guard);
            shard_idx += 1;
            after = None;
            if visited == count {
                break;
            }
        }

        let next = if shard_idx >= self.shards.len() {
            ScanCursor(CursorState::Complete)
        } else {
            ScanCursor(CursorState::At {
                shard: shard_idx,
                after: None,
            })
        };

        ScanPage { keys, next }
    }

    // == Evict Expired ==
    /// Reclaims expired entries across all shards.
    ///
    /// Each shard is processed in batches of `batch_size` entries; neither the read
    /// pass nor the write pass of a batch holds a lock for more than one batch.
    pub fn evict_expired(&self, now_ms: u64, batch_size: usize) -> usize {
        let batch_size = batch_size.max(1);
        let mut removed = 0;

        for shard in self.shards.iter() {
            let mut after: Option<String> = None;
            loop {
                let (expired, last, exhausted) = {
                    let guard = shard.read();
                    let lower = match &after {
                        Some(k) => Bound::Excluded(k.as_str()),
                        None => Bound::Unbounded,
                    };
                    let mut expired = Vec::new();
                    let mut last = None;
                    let mut examined = 0;
                    for (key, entry) in guard.range::<str, _>((lower, Bound::Unbounded)) {
                        if examined == batch_size {
                            break;
                        }
                        examined += 1;
                        last = Some(key.clone());
                        if entry.is_expired(now_ms) {
                            expired.push(key.clone());
                        }
                    }
                    (expired, last, examined < batch_size)
                };

                if !expired.is_empty() {
                    let mut guard = shard.write();
                    for key in &expired {
                        if guard.get(key).is_some_and(|entry| entry.is_expired(now_ms)) {
                            guard.remove(key);
                            removed += 1;
                        }
                    }
                }

                if exhausted || last.is_none() {
                    break;
                }
                after = last;
            }
        }

        removed
    }
}
