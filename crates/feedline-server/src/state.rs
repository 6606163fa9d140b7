//! Shared application state for the feed server.
//!
//! [`AppState`] holds the store handle every session reads through, the
//! session parameters, and the compiled pages. It is built once at startup,
//! wrapped in an [`Arc`], and never mutated afterwards: sessions share it
//! read-only.

use std::sync::Arc;

use feedline_core::SessionConfig;
use feedline_types::TEST_STREAM;

use crate::error::HandlerError;
use crate::pages::Pages;

/// Shared state for the Axum application.
///
/// Injected via Axum's `State` extractor as `Arc<AppState<R>>`.
pub struct AppState<R> {
    /// Store handle shared by all sessions.
    pub reader: Arc<R>,
    /// Parameters applied to every new session.
    pub session: SessionConfig,
    /// Stream shown by the demo page.
    pub test_stream: String,
    /// Compiled page templates.
    pub pages: Pages,
}

impl<R> AppState<R> {
    /// Create application state around a store handle.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Template`] if the pages fail to compile.
    pub fn new(reader: Arc<R>, session: SessionConfig) -> Result<Self, HandlerError> {
        Ok(Self {
            reader,
            session,
            test_stream: String::from(TEST_STREAM),
            pages: Pages::new()?,
        })
    }

    /// Use a different stream for the demo page.
    #[must_use]
    pub fn with_test_stream(mut self, stream: impl Into<String>) -> Self {
        self.test_stream = stream.into();
        self
    }
}
