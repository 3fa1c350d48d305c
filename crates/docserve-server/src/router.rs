//! Axum router setup for the documentation server

use std::any::Any;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    ServerState,
    error::ApiError,
    handlers::{doc_path, doc_query, health_check, index, stats},
};

/// Create the axum router with all routes.
///
/// Every GET route answers HEAD as well.
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index))
        // REST API endpoints
        .route("/api/health", get(health_check))
        .route("/api/stats", get(stats))
        // Documentation
        .route("/doc", get(doc_query))
        .route("/*path", get(doc_path))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::internal().into_response()
}
