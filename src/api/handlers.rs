//! API Handlers
//!
//! HTTP request handlers exposing the cache to other services.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{Cache, CacheConfig, CacheOps};
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, InvalidateRequest, KeysQuery, KeysResponse,
    RemovedResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache handle is cheap to clone and synchronizes internally, so no outer
/// lock is needed.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Cache,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(Cache::new(config.cache_config()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Cache::new(CacheConfig::default()))
    }
}

/// Handler for PUT /cache/:key
///
/// Stores a JSON value, with the default TTL unless the body names one.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    match req.ttl() {
        Some(ttl) => state.cache.set_with_ttl(&key, &req.value, ttl)?,
        None => state.cache.set(&key, &req.value)?,
    }

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get::<Value>(&key)?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /cache/:key
///
/// Succeeds whether or not the key existed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.del(&key);
    Json(DeleteResponse::new(key, deleted))
}

/// Handler for DELETE /cache
pub async fn flush_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    Json(RemovedResponse::flushed(state.cache.flush_all()))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<RemovedResponse>> {
    if req.pattern.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Pattern cannot be empty".to_string(),
        ));
    }

    let removed = state.cache.del_by_pattern(&req.pattern)?;
    Ok(Json(RemovedResponse::matched(req.pattern, removed)))
}

/// Handler for GET /keys
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Result<Json<KeysResponse>> {
    let keys = match query.pattern.as_deref() {
        Some(pattern) => state.cache.keys_matching(pattern)?,
        None => state.cache.keys(),
    };

    Ok(Json(KeysResponse::new(keys)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
