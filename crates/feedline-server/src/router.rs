//! Axum router construction for the feed server.
//!
//! Assembles the feed and page routes into a single [`Router`] with
//! request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use feedline_store::StreamReader;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the feed server.
///
/// The router includes:
/// - `GET /ws` -- `WebSocket` stream feed
/// - `GET /test` -- stream demo page
///
/// Other methods on these paths are answered with `405 Method Not Allowed`.
pub fn build_router<R>(state: Arc<AppState<R>>) -> Router
where
    R: StreamReader + 'static,
{
    Router::new()
        .route("/ws", get(ws::ws_feed::<R>))
        .route("/test", get(handlers::test_page::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
