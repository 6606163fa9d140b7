//! Error types for the bridge binary.
//!
//! [`BridgeError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the bridge binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// An environment variable was missing or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// Session parameters failed validation.
    #[error("session config error: {source}")]
    Session {
        /// The underlying validation error.
        #[from]
        source: feedline_core::ConfigError,
    },

    /// Connecting to the stream store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: feedline_store::StoreError,
    },

    /// Page templates failed to compile.
    #[error("page error: {source}")]
    Pages {
        /// The underlying handler error.
        #[from]
        source: feedline_server::HandlerError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: feedline_server::ServerError,
    },
}
