//! The narrow read interface the bridge consumes.
//!
//! A [`StreamReader`] answers a single question: "which entries of stream
//! S come after cursor C, waiting up to D for the first one to arrive?"
//! Implementations exist for Redis/Dragonfly ([`RedisStreams`]) and for an
//! in-process log ([`MemoryStreams`]). Sessions are generic over the
//! reader, so tests can substitute their own.
//!
//! [`RedisStreams`]: crate::redis::RedisStreams
//! [`MemoryStreams`]: crate::memory::MemoryStreams

use std::future::Future;
use std::time::Duration;

use feedline_types::{Batch, StreamId};

use crate::error::StoreError;

/// Parameters of a single blocking read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// How long to wait for the first entry when none is available yet.
    /// Zero means "do not wait".
    pub block: Duration,
    /// Upper bound on the number of entries returned, if any.
    pub count: Option<u64>,
}

impl ReadOptions {
    /// Block for up to `block`, with no entry limit.
    pub const fn blocking(block: Duration) -> Self {
        Self { block, count: None }
    }
}

/// A source of stream entries addressed by cursor.
///
/// The store client behind an implementation is shared by every session
/// and must tolerate concurrent calls.
pub trait StreamReader: Send + Sync {
    /// Read entries of `stream` strictly after `cursor`, in log order.
    ///
    /// Returns an empty batch if nothing arrives within
    /// [`ReadOptions::block`]. A stream that does not exist reads as empty.
    fn read_after(
        &self,
        stream: &str,
        cursor: StreamId,
        options: ReadOptions,
    ) -> impl Future<Output = Result<Batch, StoreError>> + Send;
}
