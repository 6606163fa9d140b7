//! Stream read layer for the Feedline bridge.
//!
//! The bridge only ever *reads* streams. This crate defines that read
//! interface and provides the two stores behind it.
//!
//! # Architecture
//!
//! ```text
//! Session pump
//!     |
//!     +-- StreamReader::read_after --> RedisStreams  (XREAD ... BLOCK ...)
//!                                 \--> MemoryStreams (in-process log)
//! ```
//!
//! # Modules
//!
//! - [`reader`] -- The [`StreamReader`] trait and read options
//! - [`redis`] -- Redis/Dragonfly implementation over a `fred` pool
//! - [`memory`] -- In-memory implementation with blocking reads
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod reader;
pub mod redis;

// Re-export primary types for convenience.
pub use error::{StoreError, StoreErrorKind};
pub use memory::MemoryStreams;
pub use reader::{ReadOptions, StreamReader};
pub use redis::{READ_MARGIN, RedisSettings, RedisStreams};
