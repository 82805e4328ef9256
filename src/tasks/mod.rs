//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is in use.
//!
//! # Tasks
//! - TTL Cleanup: Reclaims expired cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
