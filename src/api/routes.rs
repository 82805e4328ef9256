//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, flush_handler, get_handler, health_handler, invalidate_handler,
    keys_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache/:key` - Store a JSON value
/// - `GET /cache/:key` - Retrieve a value by key
/// - `DELETE /cache/:key` - Delete a key
/// - `DELETE /cache` - Flush every entry
/// - `POST /cache/invalidate` - Delete every key matching a glob pattern
/// - `GET /keys` - List live keys, optionally filtered by `?pattern=`
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", axum::routing::delete(flush_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route(
            "/cache/:key",
            get(get_handler).put(set_handler).delete(delete_handler),
        )
        .route("/keys", get(keys_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use tower::util::ServiceExt;

    async fn status_of(method: Method, uri: &str, body: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        create_router(AppState::default())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_route() {
        assert_eq!(status_of(Method::GET, "/health", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_put_route() {
        let status = status_of(Method::PUT, "/cache/test", Some(r#"{"value":"hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_key_is_404() {
        let status = status_of(Method::GET, "/cache/nonexistent", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_flush_route() {
        assert_eq!(status_of(Method::DELETE, "/cache", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalidate_is_not_captured_by_key_route() {
        let status = status_of(Method::POST, "/cache/invalidate", Some(r#"{"pattern":"*"}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unrouted_method_is_rejected() {
        let status = status_of(Method::POST, "/cache/some_key", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
