//! Error types for the HTTP handlers.
//!
//! [`HandlerError`] covers failures inside request handlers and converts
//! into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Store
//! failures are *not* handler errors: the feed reports them in-band.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur while serving an HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A page template failed to load or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, "Request failed");
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_errors_are_server_errors() {
        let err = HandlerError::from(minijinja::Error::new(
            minijinja::ErrorKind::TemplateNotFound,
            "missing",
        ));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
