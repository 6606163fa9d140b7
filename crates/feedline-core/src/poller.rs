//! Cursor-tracking poller.
//!
//! A [`Poller`] turns the store's "read after cursor" primitive into a
//! `(batch, next cursor)` pair. It holds no state between calls apart from
//! its configuration: the caller owns the cursor and feeds the returned
//! [`Poll::next_cursor`] back in on the next call.

use std::sync::Arc;
use std::time::Duration;

use feedline_store::{ReadOptions, StoreError, StreamReader};
use feedline_types::{Batch, StreamId};

/// Result of one successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    /// Entries after the requested cursor, in log order. May be empty.
    pub batch: Batch,
    /// ID of the last entry in `batch`, or the requested cursor if empty.
    pub next_cursor: StreamId,
}

/// Reads a stream after a cursor, blocking up to a fixed wait.
pub struct Poller<R> {
    reader: Arc<R>,
    options: ReadOptions,
}

impl<R: StreamReader> Poller<R> {
    /// Create a poller that waits up to `max_wait` per call and returns at
    /// most `count` entries (unbounded if `None`).
    pub const fn new(reader: Arc<R>, max_wait: Duration, count: Option<u64>) -> Self {
        Self {
            reader,
            options: ReadOptions {
                block: max_wait,
                count,
            },
        }
    }

    /// The longest a single [`poll`](Self::poll) blocks waiting for data.
    pub const fn max_wait(&self) -> Duration {
        self.options.block
    }

    /// Fetch the entries of `stream` after `cursor`.
    ///
    /// An empty result leaves the cursor where it was. Store failures are
    /// returned as-is; the poller stays usable and the caller decides
    /// whether to try again.
    pub async fn poll(&self, stream: &str, cursor: StreamId) -> Result<Poll, StoreError> {
        let batch = self.reader.read_after(stream, cursor, self.options).await?;
        let next_cursor = batch.last().map_or(cursor, |entry| entry.id);
        Ok(Poll { batch, next_cursor })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use feedline_store::MemoryStreams;

    use super::*;

    fn poller(store: &Arc<MemoryStreams>) -> Poller<MemoryStreams> {
        Poller::new(Arc::clone(store), Duration::from_millis(100), None)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_poll_keeps_cursor() {
        let store = Arc::new(MemoryStreams::new());
        let poller = poller(&store);

        for cursor in [StreamId::ZERO, StreamId::new(7, 3), StreamId::new(u64::MAX, 0)] {
            let poll = poller.poll("s", cursor).await.unwrap();
            assert!(poll.batch.is_empty());
            assert_eq!(poll.next_cursor, cursor);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cursor_advances_to_last_entry_without_redelivery() {
        let store = Arc::new(MemoryStreams::new());
        for (ms, value) in [(1, "a"), (2, "b"), (3, "c")] {
            store
                .append_with_id("s", StreamId::new(ms, 0), [("k", value)])
                .await
                .unwrap();
        }
        let poller = poller(&store);

        let first = poller.poll("s", StreamId::ZERO).await.unwrap();
        assert_eq!(first.batch.len(), 3);
        assert_eq!(first.next_cursor, first.batch[2].id);

        store
            .append_with_id("s", StreamId::new(4, 0), [("k", "d")])
            .await
            .unwrap();
        let second = poller.poll("s", first.next_cursor).await.unwrap();
        assert_eq!(second.batch.len(), 1);
        assert_eq!(second.batch[0].id, StreamId::new(4, 0));
        assert!(second.batch.iter().all(|e| e.id > first.next_cursor));
    }

    #[tokio::test(start_paused = true)]
    async fn count_bounds_each_poll() {
        let store = Arc::new(MemoryStreams::new());
        for ms in 1..=3 {
            store
                .append_with_id("s", StreamId::new(ms, 0), [("n", ms.to_string())])
                .await
                .unwrap();
        }
        let poller = Poller::new(Arc::clone(&store), Duration::from_millis(100), Some(2));

        let first = poller.poll("s", StreamId::ZERO).await.unwrap();
        assert_eq!(first.next_cursor, StreamId::new(2, 0));
        let second = poller.poll("s", first.next_cursor).await.unwrap();
        assert_eq!(second.next_cursor, StreamId::new(3, 0));
        assert_eq!(second.batch.len(), 1);
    }
}
