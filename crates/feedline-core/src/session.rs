//! Per-connection session pump.
//!
//! A [`Session`] pairs one client connection with one stream and one
//! advancing cursor. [`Session::run`] drives it on a fixed tick:
//!
//! ```text
//! tick --> poll(stream, cursor) --+-- error ------> report once, keep cursor
//!                                 +-- empty ------> nothing
//!                                 +-- entries ----> encode, write, advance
//! ```
//!
//! Polls and writes are strictly sequential within a session: the next
//! tick is not taken until the previous write has finished or failed.
//!
//! # Lifecycle
//!
//! `Active` until a write fails, a write exceeds its deadline, or the
//! client goes away. The session then moves through `Closing` (the
//! connection is closed, once) to `Terminated`, and [`Session::run`]
//! returns a [`SessionReport`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use feedline_store::StreamReader;
use feedline_types::StreamId;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::last_error::LastError;
use crate::poller::Poller;
use crate::sink::{FrameSink, SinkError};
use crate::wire::{self, PARSE_ERROR};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ticking, polling, and writing.
    Active,
    /// Shutting down; the connection is being closed.
    Closing,
    /// The connection has been released.
    Terminated,
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Writing a frame failed.
    #[error("write failed: {0}")]
    Write(#[from] SinkError),

    /// Writing a frame did not finish within the deadline.
    #[error("write timed out after {0:?}")]
    WriteTimeout(Duration),
}

/// Why a session ended.
#[derive(Debug)]
pub enum CloseReason {
    /// The client closed the connection or it dropped.
    ClientClosed,
    /// A write failed or timed out.
    Failed(SessionError),
}

/// Summary of a finished session.
#[derive(Debug)]
pub struct SessionReport {
    /// Session identifier.
    pub id: Uuid,
    /// The stream that was followed.
    pub stream: String,
    /// Cursor at the time the session ended.
    pub final_cursor: StreamId,
    /// Frames successfully written.
    pub frames_sent: u64,
    /// Why the session ended.
    pub reason: CloseReason,
    /// State after shutdown; always [`SessionState::Terminated`].
    pub state: SessionState,
}

/// Where a new session starts reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// Stream to follow.
    pub stream: String,
    /// Entries after this cursor are delivered.
    pub cursor: StreamId,
}

impl SessionRequest {
    /// Build a request from optional client parameters.
    ///
    /// A missing or empty stream name selects `default_stream`; any other
    /// name is used verbatim, whitespace included. A missing or
    /// unparseable cursor starts at [`StreamId::ZERO`] rather than
    /// rejecting the connection.
    pub fn from_params(cursor: Option<&str>, stream: Option<&str>, default_stream: &str) -> Self {
        let stream = stream
            .filter(|name| !name.is_empty())
            .unwrap_or(default_stream)
            .to_owned();

        let cursor = match cursor.map(str::trim).filter(|raw| !raw.is_empty()) {
            None => StreamId::ZERO,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                debug!(error = %e, "Ignoring malformed cursor, starting from 0-0");
                StreamId::ZERO
            }),
        };

        Self { stream, cursor }
    }
}

/// Bridge state for one client connection.
pub struct Session<R> {
    id: Uuid,
    stream: String,
    cursor: StreamId,
    last_error: LastError,
    poller: Poller<R>,
    write_wait: Duration,
    state: SessionState,
    frames_sent: u64,
}

impl<R: StreamReader> Session<R> {
    /// Create an active session reading `request.stream` through `reader`.
    pub fn new(reader: Arc<R>, request: SessionRequest, config: &SessionConfig) -> Self {
        // A zero period would make the tick interval panic.
        let poll_period = config.poll_period.max(Duration::from_millis(1));
        Self {
            id: Uuid::now_v7(),
            stream: request.stream,
            cursor: request.cursor,
            last_error: LastError::default(),
            poller: Poller::new(reader, poll_period, config.read_count),
            write_wait: config.write_wait,
            state: SessionState::Active,
            frames_sent: 0,
        }
    }

    /// Session identifier, for log correlation.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The stream this session follows.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// The current read cursor.
    pub const fn cursor(&self) -> StreamId {
        self.cursor
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The last failure reported to the client, if still in effect.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.message()
    }

    /// Run one poll and return the frame to send, if any.
    ///
    /// Store errors leave the cursor unchanged and yield the error text the
    /// first time a given failure is seen. A batch that cannot be encoded
    /// is skipped, so the session does not stall on it, and every skipped
    /// batch yields [`PARSE_ERROR`].
    pub async fn step(&mut self) -> Option<String> {
        let poll = match self.poller.poll(&self.stream, self.cursor).await {
            Ok(poll) => poll,
            Err(e) => {
                let frame = self.last_error.admit(e.kind(), e.to_string());
                if frame.is_some() {
                    warn!(session = %self.id, stream = %self.stream, error = %e, "Stream read failed");
                }
                return frame;
            }
        };

        if poll.batch.is_empty() {
            self.last_error.clear();
            return None;
        }

        self.cursor = poll.next_cursor;
        self.last_error.clear();
        match wire::encode_batch(&poll.batch) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(
                    session = %self.id,
                    stream = %self.stream,
                    cursor = %self.cursor,
                    error = %e,
                    "Failed to encode batch"
                );
                Some(PARSE_ERROR.to_owned())
            }
        }
    }

    /// Drive the session until the connection ends.
    ///
    /// `client_gone` resolves when the client closes its side; it is
    /// watched while waiting for the next tick and while polling. The
    /// connection is closed exactly once, on every exit path.
    pub async fn run<C, F>(mut self, mut conn: C, client_gone: F) -> SessionReport
    where
        C: FrameSink,
        F: Future<Output = ()> + Send,
    {
        info!(
            session = %self.id,
            stream = %self.stream,
            cursor = %self.cursor,
            "Session started"
        );

        let reason = self.pump(&mut conn, client_gone).await;

        self.state = SessionState::Closing;
        conn.close().await;
        self.state = SessionState::Terminated;

        match &reason {
            CloseReason::ClientClosed => info!(
                session = %self.id,
                frames_sent = self.frames_sent,
                cursor = %self.cursor,
                "Session closed by client"
            ),
            CloseReason::Failed(e) => info!(
                session = %self.id,
                frames_sent = self.frames_sent,
                cursor = %self.cursor,
                error = %e,
                "Session terminated"
            ),
        }

        SessionReport {
            id: self.id,
            stream: self.stream,
            final_cursor: self.cursor,
            frames_sent: self.frames_sent,
            reason,
            state: self.state,
        }
    }

    /// The tick loop. Returns as soon as the session must close.
    async fn pump<C, F>(&mut self, conn: &mut C, client_gone: F) -> CloseReason
    where
        C: FrameSink,
        F: Future<Output = ()> + Send,
    {
        let mut ticker = tokio::time::interval(self.poller.max_wait());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(client_gone);

        loop {
            tokio::select! {
                biased;
                () = &mut client_gone => return CloseReason::ClientClosed,
                _ = ticker.tick() => {}
            }

            // Polls stall while the store is unreachable.
            let step = tokio::select! {
                biased;
                () = &mut client_gone => return CloseReason::ClientClosed,
                frame = self.step() => frame,
            };
            let Some(frame) = step else {
                continue;
            };

            match tokio::time::timeout(self.write_wait, conn.send_text(frame)).await {
                Ok(Ok(())) => self.frames_sent = self.frames_sent.saturating_add(1),
                Ok(Err(e)) => return CloseReason::Failed(SessionError::Write(e)),
                Err(_elapsed) => {
                    return CloseReason::Failed(SessionError::WriteTimeout(self.write_wait));
                }
            }
        }
    }
}
