//! Session timing and defaulting parameters.
//!
//! One [`SessionConfig`] is built at startup and shared by every session.
//! It is plain data; loading it from the environment is the binary's job.

use std::time::Duration;

use feedline_types::DEFAULT_STREAM;

/// How often a session polls, which is also how long each poll may block.
pub const POLL_PERIOD: Duration = Duration::from_millis(100);

/// Time allowed to write one frame to the client.
pub const WRITE_WAIT: Duration = Duration::from_secs(10);

/// Errors found while validating a [`SessionConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The poll period must be positive.
    #[error("poll period must be greater than zero")]
    ZeroPollPeriod,

    /// The write deadline must be positive.
    #[error("write wait must be greater than zero")]
    ZeroWriteWait,

    /// The fallback stream name must not be empty.
    #[error("default stream name must not be empty")]
    EmptyDefaultStream,
}

/// Parameters shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Tick interval, and the maximum time one poll blocks.
    pub poll_period: Duration,
    /// Deadline for writing a single frame.
    pub write_wait: Duration,
    /// Optional cap on entries per poll.
    pub read_count: Option<u64>,
    /// Stream used when the client does not name one.
    pub default_stream: String,
}

impl SessionConfig {
    /// Check that the configuration can drive a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_period.is_zero() {
            return Err(ConfigError::ZeroPollPeriod);
        }
        if self.write_wait.is_zero() {
            return Err(ConfigError::ZeroWriteWait);
        }
        if self.default_stream.is_empty() {
            return Err(ConfigError::EmptyDefaultStream);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_period: POLL_PERIOD,
            write_wait: WRITE_WAIT,
            read_count: None,
            default_stream: String::from(DEFAULT_STREAM),
        }
    }
}
