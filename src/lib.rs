//! Mini Cache - An embeddable in-process cache
//!
//! Provides TTL expiration, sharded locking and glob-pattern invalidation, plus
//! an HTTP host server that exposes the cache to other services.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheConfig, CacheOps, Ttl};
pub use config::Config;
pub use error::CacheError;
pub use tasks::spawn_cleanup_task;
