//! Reverse proxy gateway for sandboxed analytics traffic.
//!
//! The sandbox rewrites outbound calls for allow-listed hosts to
//! `{origin}{proxy_path}?url=<absolute-url>`. This crate answers those
//! requests by forwarding them to the embedded target and streaming the
//! upstream response back unchanged. Host policy lives with the sandbox
//! configuration; the gateway forwards whatever well-formed target it gets.

pub mod config;
pub mod error;
pub mod proxy;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let proxy_path = state.proxy_path.clone();

    Router::new()
        .route("/health", get(health))
        .route(&proxy_path, any(proxy::forward))
        // Mounted like a prefix: anything below the proxy path is discarded too.
        // `{*rest}` never matches an empty tail.
        .route(&format!("{proxy_path}/"), any(proxy::forward))
        .route(&format!("{proxy_path}/{{*rest}}"), any(proxy::forward))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "gateway",
    }))
}
