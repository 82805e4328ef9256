//! Cache Module
//!
//! Provides an in-process cache with TTL expiration, sharded locking and
//! glob-pattern invalidation.

mod codec;
mod entry;
pub mod expiry;
mod facade;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use codec::{Codec, CodecError, JsonCodec};
pub use entry::CacheEntry;
pub use expiry::{Clock, ManualClock, SystemClock, Ttl};
pub use facade::{Cache, CacheConfig, CacheOps};
pub use pattern::{GlobPattern, PatternError};
pub use stats::{CacheStats, StatsRecorder};
pub use store::{EntryStore, Lookup, ScanCursor, ScanPage};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed encoded value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
