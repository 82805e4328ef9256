//! API Module
//!
//! HTTP handlers and routing for a host server that embeds the cache.
//!
//! # Endpoints
//! - `PUT /cache/:key` - Store a value
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `DELETE /cache` - Flush the cache
//! - `POST /cache/invalidate` - Delete by glob pattern
//! - `GET /keys` - List live keys
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
