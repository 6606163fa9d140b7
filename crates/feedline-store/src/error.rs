//! Error types for the stream read layer.
//!
//! Every read failure is a [`StoreError`]. Callers that need to tell
//! failure conditions apart (for example to avoid reporting the same
//! outage twice) use [`StoreError::kind`] rather than matching on the
//! rendered message.

use std::time::Duration;

use fred::error::ErrorKind;

/// Errors that can occur while reading from a stream store.
///
/// The `Display` output of the backend variants is the backend's own
/// message, unprefixed, because it is shown to clients as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A Redis/Dragonfly operation failed.
    #[error("{0}")]
    Redis(#[from] fred::error::Error),

    /// The store is not reachable.
    #[error("{0}")]
    Unavailable(String),

    /// The store did not answer within the read deadline.
    #[error("read timed out after {0:?}")]
    TimedOut(Duration),

    /// The store replied with something that is not a stream reply.
    #[error("malformed stream reply: {0}")]
    MalformedReply(String),

    /// An append was rejected because its ID does not advance the stream.
    #[error("ID {id} is equal or smaller than the stream top item {top}")]
    IdNotIncreasing {
        /// The rejected ID.
        id: String,
        /// The current last ID of the stream.
        top: String,
    },

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// The connection to the store failed or was lost.
    Connection,
    /// The store did not answer in time.
    Timeout,
    /// The store answered, but with an error or an unusable reply.
    Reply,
    /// The client was misconfigured.
    Config,
}

impl StoreError {
    /// Classify this error.
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::Redis(e) => match e.kind() {
                ErrorKind::IO | ErrorKind::Canceled => StoreErrorKind::Connection,
                ErrorKind::Timeout => StoreErrorKind::Timeout,
                ErrorKind::Config | ErrorKind::Url => StoreErrorKind::Config,
                _ => StoreErrorKind::Reply,
            },
            Self::Unavailable(_) => StoreErrorKind::Connection,
            Self::TimedOut(_) => StoreErrorKind::Timeout,
            Self::MalformedReply(_) | Self::IdNotIncreasing { .. } => StoreErrorKind::Reply,
            Self::Config(_) => StoreErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_messages_are_not_prefixed() {
        let err = StoreError::Unavailable(String::from("connection refused"));
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.kind(), StoreErrorKind::Connection);
    }

    #[test]
    fn redis_errors_are_classified_by_kind() {
        let io = StoreError::from(fred::error::Error::new(ErrorKind::IO, "refused"));
        assert_eq!(io.kind(), StoreErrorKind::Connection);

        let timeout = StoreError::from(fred::error::Error::new(ErrorKind::Timeout, "slow"));
        assert_eq!(timeout.kind(), StoreErrorKind::Timeout);

        let parse = StoreError::from(fred::error::Error::new(ErrorKind::Parse, "bad"));
        assert_eq!(parse.kind(), StoreErrorKind::Reply);
    }
}
