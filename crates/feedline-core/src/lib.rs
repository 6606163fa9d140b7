//! Cursor tracking and session pumping for the Feedline bridge.
//!
//! This crate turns the store's blocking "read after cursor" primitive into
//! a live feed for one connection:
//!
//! - [`poller::Poller`] -- one read, returning the batch and the next cursor
//! - [`session::Session`] -- the per-connection tick loop: poll, encode,
//!   write, suppress repeated errors, close exactly once
//!
//! Sessions share nothing but the store handle, which is passed in
//! explicitly. The connection side is abstracted by [`sink::FrameSink`].
//!
//! # Modules
//!
//! - [`config`] -- Session timing and defaults
//! - [`last_error`] -- Repeated-error suppression
//! - [`poller`] -- Cursor-tracking poller
//! - [`session`] -- Session pump and lifecycle
//! - [`sink`] -- Outbound connection abstraction
//! - [`wire`] -- JSON wire encoding of batches

pub mod config;
pub mod last_error;
pub mod poller;
pub mod session;
pub mod sink;
pub mod wire;

// Re-export primary types for convenience.
pub use config::{ConfigError, SessionConfig};
pub use poller::{Poll, Poller};
pub use session::{CloseReason, Session, SessionError, SessionReport, SessionRequest, SessionState};
pub use sink::{FrameSink, SinkError};
