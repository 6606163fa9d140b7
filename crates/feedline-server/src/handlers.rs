//! HTTP endpoint handlers other than the feed itself.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/test` | Stream demo page for the test stream |

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use axum::response::Html;
use feedline_core::Poller;
use feedline_core::wire::{self, PARSE_ERROR};
use feedline_store::StreamReader;
use feedline_types::StreamId;

use crate::error::HandlerError;
use crate::pages::TestPage;
use crate::state::AppState;

/// Host used in the page's socket URL when the request has no `Host`.
const FALLBACK_HOST: &str = "localhost";

/// Serve the stream demo page.
///
/// Reads the test stream from the beginning, embeds the result, and
/// points the page's `WebSocket` at the cursor just past it. If the read
/// fails, the error text is shown instead and the socket starts from
/// `0-0`.
pub async fn test_page<R: StreamReader>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Result<Html<String>, HandlerError> {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(FALLBACK_HOST);

    let poller = Poller::new(
        Arc::clone(&state.reader),
        state.session.poll_period,
        state.session.read_count,
    );

    let (data, cursor) = match poller.poll(&state.test_stream, StreamId::ZERO).await {
        Ok(poll) if poll.batch.is_empty() => (String::new(), poll.next_cursor),
        Ok(poll) => {
            let data = wire::encode_batch(&poll.batch).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to encode test stream batch");
                PARSE_ERROR.to_owned()
            });
            (data, poll.next_cursor)
        }
        Err(e) => (e.to_string(), StreamId::ZERO),
    };

    let html = state.pages.render_test_page(&TestPage {
        host,
        data: &data,
        last_mod: cursor.to_string(),
        stream: &state.test_stream,
    })?;
    Ok(Html(html))
}
