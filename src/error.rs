//! Error types for the cache
//!
//! Provides unified error handling using thiserror. The core cache only produces
//! the codec, key and pattern variants; the rest belong to the HTTP host.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::PatternError;
use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its host server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be encoded to bytes
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Stored bytes could not be decoded; the entry is treated as corrupted
    #[error("Deserialization failed for key '{key}': {reason}")]
    Deserialization { key: String, reason: String },

    /// Malformed glob pattern, rejected before any scan starts
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    /// Key is empty or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Encoded value exceeds the size limit
    #[error("Value of {size} bytes exceeds maximum size of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidKey(_)
            | CacheError::InvalidRequest(_)
            | CacheError::Pattern(_)
            | CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::ValueTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::Deserialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
