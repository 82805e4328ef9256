//! Expiry Module
//!
//! Liveness rules for cache entries and the clocks they are evaluated against.
//! Timestamps are Unix milliseconds throughout.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Clock ==
/// Source of the current time, injected so TTL behavior can be driven in tests.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current Unix timestamp in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        current_timestamp_ms()
    }
}

/// Manually driven clock. Time only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    /// Moves the clock forward, stopping at `u64::MAX`.
    pub fn advance(&self, by: Duration) {
        let by = duration_ms(by);
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }

    /// Jumps the clock to an absolute timestamp.
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// == Ttl ==
/// Time-to-live requested for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Entry never expires
    Never,
    /// Entry expires once the duration has elapsed; zero means immediately
    After(Duration),
}

impl Ttl {
    /// Builds a TTL from signed seconds. Zero or negative means "expire immediately".
    pub fn from_secs(secs: i64) -> Self {
        if secs <= 0 {
            Ttl::After(Duration::ZERO)
        } else {
            Ttl::After(Duration::from_secs(secs as u64))
        }
    }

    /// True when an entry written with this TTL would never be visible.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Ttl::After(d) if d.is_zero())
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Ttl::After(d)
    }
}

// == Liveness ==
/// Absolute expiration timestamp for a write made at `now_ms`.
pub fn deadline(now_ms: u64, ttl: Ttl) -> Option<u64> {
    match ttl {
        Ttl::Never => None,
        Ttl::After(d) => Some(now_ms.saturating_add(duration_ms(d))),
    }
}

/// An entry is expired once `now >= expires_at`. Entries without a deadline never expire.
pub fn is_expired(expires_at: Option<u64>, now_ms: u64) -> bool {
    match expires_at {
        Some(expires) => now_ms >= expires,
        None => false,
    }
}

/// Remaining lifetime, `None` for entries that never expire.
pub fn remaining(expires_at: Option<u64>, now_ms: u64) -> Option<Duration> {
    expires_at.map(|expires| Duration::from_millis(expires.saturating_sub(now_ms)))
}

// == Utility Functions ==
/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}
