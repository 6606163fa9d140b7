//! `WebSocket` handler for the live stream feed.
//!
//! Clients connect to `GET /ws?lastMod=<cursor>&Stream=<name>`. Each
//! connection gets its own [`Session`] running on the upgrade task; the
//! socket is split so the session writes frames while a watcher on the
//! read half notices when the client leaves.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use feedline_core::{CloseReason, FrameSink, Session, SessionRequest, SinkError};
use feedline_store::StreamReader;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt as _, StreamExt as _};
use tracing::debug;

use crate::state::AppState;

/// Query parameters accepted by `GET /ws`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct FeedParams {
    /// Cursor to resume after (`<ms>-<seq>`).
    #[serde(rename = "lastMod")]
    pub last_mod: Option<String>,
    /// Stream to follow.
    #[serde(rename = "Stream")]
    pub stream: Option<String>,
}

/// Upgrade an HTTP request to a `WebSocket` connection and start a
/// session for it.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_feed<R>(
    ws: WebSocketUpgrade,
    Query(params): Query<FeedParams>,
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse
where
    R: StreamReader + 'static,
{
    let request = SessionRequest::from_params(
        params.last_mod.as_deref(),
        params.stream.as_deref(),
        &state.session.default_stream,
    );
    ws.on_upgrade(move |socket| handle_ws(socket, request, state))
}

/// Run one session over an upgraded socket until either side ends it.
async fn handle_ws<R: StreamReader>(
    socket: WebSocket,
    request: SessionRequest,
    state: Arc<AppState<R>>,
) {
    let (sink, stream) = socket.split();
    let session = Session::new(Arc::clone(&state.reader), request, &state.session);
    let report = session.run(WsSink { sink }, client_gone(stream)).await;

    if let CloseReason::Failed(e) = &report.reason {
        debug!(session = %report.id, error = %e, "WebSocket session ended by write failure");
    }
}

/// Write half of a client `WebSocket`.
pub struct WsSink {
    sink: SplitSink<WebSocket, Message>,
}

impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), SinkError> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))
    }

    async fn close(mut self) {
        if let Err(e) = self.sink.close().await {
            debug!("WebSocket close failed: {e}");
        }
    }
}

/// Resolve once the client sends a close frame, errors, or disconnects.
///
/// Other inbound messages are ignored; pings are answered by the
/// transport.
async fn client_gone(mut stream: SplitStream<WebSocket>) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client sent close frame");
                return;
            }
            Err(e) => {
                debug!("WebSocket error: {e}");
                return;
            }
            Ok(_) => {}
        }
    }
    debug!("WebSocket client disconnected");
}
