//! Cache Entry Module
//!
//! Defines the record stored for each key: opaque bytes plus expiry metadata.

use std::time::Duration;

use crate::cache::expiry::{self, Ttl};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Encoded value, opaque to the store
    pub value: Vec<u8>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry written at `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The encoded value to store
    /// * `ttl` - Lifetime of the entry
    /// * `now_ms` - Write time, taken from the cache clock
    pub fn new(value: Vec<u8>, ttl: Ttl, now_ms: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: expiry::deadline(now_ms, ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry whose deadline equals `now_ms` is already expired.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        expiry::is_expired(self.expires_at, now_ms)
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    pub fn ttl_remaining(&self, now_ms: u64) -> Option<Duration> {
        expiry::remaining(self.expires_at, now_ms)
    }

    /// Size of the stored value in bytes.
    pub fn size(&self) -> usize {
        self.value.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new(b"test_value".to_vec(), Ttl::Never, 1_000);

        assert_eq!(entry.value, b"test_value");
        assert_eq!(entry.created_at, 1_000);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired(u64::MAX));
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new(b"v".to_vec(), Ttl::from_secs(60), 1_000);

        assert_eq!(entry.expires_at, Some(61_000));
        assert!(!entry.is_expired(60_999));
        assert!(entry.is_expired(61_000));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(b"v".to_vec(), Ttl::from_secs(10), 0);

        assert_eq!(entry.ttl_remaining(4_000), Some(Duration::from_secs(6)));
        assert_eq!(entry.ttl_remaining(20_000), Some(Duration::ZERO));
        assert_eq!(
            CacheEntry::new(vec![], Ttl::Never, 0).ttl_remaining(5),
            None
        );
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new(b"v".to_vec(), Ttl::from_secs(0), 500);
        assert!(entry.is_expired(500));
    }
}
