//! Outbound side of a client connection.
//!
//! The session pump only needs to push text frames and to close the
//! connection once at the end. [`FrameSink`] captures exactly that, so the
//! pump can drive a WebSocket in production and a recorder in tests.

use std::future::Future;

/// Errors from writing to a client connection.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The peer has already gone away.
    #[error("connection closed")]
    Closed,

    /// The transport reported a failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A connection the session pump writes frames to.
pub trait FrameSink: Send {
    /// Send one UTF-8 text frame.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Close the connection. Consumes the sink, so it runs at most once.
    fn close(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;
}
