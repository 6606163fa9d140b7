//! Shared type definitions for the Feedline stream bridge.
//!
//! Both the store layer and the session pump speak in these types, so they
//! live in their own crate with no runtime dependencies.
//!
//! # Modules
//!
//! - [`ids`] -- Composite `<ms>-<seq>` stream IDs, used as read cursors
//! - [`entry`] -- Schemaless stream entries and batches

pub mod entry;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use entry::{Batch, FieldValue, StreamEntry};
pub use ids::{ParseStreamIdError, StreamId};

/// Stream read when a client does not name one.
pub const DEFAULT_STREAM: &str = "default_stream";

/// Stream rendered by the demo page.
pub const TEST_STREAM: &str = "test_stream";
