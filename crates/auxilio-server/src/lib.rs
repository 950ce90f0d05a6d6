//! Auxilio reference backend server library logic.
//!
//! Implements the `/chat` contract the session manager speaks, backed by
//! the same triage classifier the client falls back to. Per-session
//! contexts live in memory only; there is no persistence layer.

pub mod api_chat;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KiB). Protects against oversized payloads;
/// real utterances are a few hundred bytes.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Hard cap on utterances remembered per session. Older utterances are
/// dropped first; classification quality degrades gracefully.
pub(crate) const MAX_SESSION_UTTERANCES: usize = 20;

/// Per-session conversation context used for follow-up refinement.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Utterances received for this session, oldest first.
    pub utterances: Vec<String>,
}

/// Application state shared across all request handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// Per-session contexts, keyed by the client's opaque session ID.
    ///
    /// Uses `std::sync::RwLock` intentionally: all lock acquisitions are
    /// brief HashMap operations that never span `.await` points.
    pub sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
}

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by load balancers,
/// monitoring, and CI to verify the server is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(api_chat::chat_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
