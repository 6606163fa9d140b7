//! In-process stream log.
//!
//! [`MemoryStreams`] keeps every stream as a vector of entries behind a
//! [`RwLock`] and wakes blocked readers through a [`Notify`] on append.
//! It follows the same ID rules as a Redis stream: IDs strictly increase,
//! and auto-assigned IDs use the wall clock in milliseconds. Used for
//! local development and as the default reader in tests.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use feedline_types::{Batch, FieldValue, StreamEntry, StreamId};
use tokio::sync::{Notify, RwLock};

use crate::error::StoreError;
use crate::reader::{ReadOptions, StreamReader};

/// A set of named, append-only streams held in memory.
#[derive(Debug, Default)]
pub struct MemoryStreams {
    streams: RwLock<HashMap<String, Vec<StreamEntry>>>,
    appended: Notify,
}

impl MemoryStreams {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry with an auto-assigned ID and return that ID.
    ///
    /// The ID is `<now ms>-0`, or the successor of the stream's last ID
    /// if the clock has not moved past it.
    pub async fn append<K, V>(
        &self,
        stream: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<StreamId, StoreError>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut streams = self.streams.write().await;
        let entries = streams.entry(stream.to_owned()).or_default();
        let now = StreamId::new(now_millis(), 0);
        let id = match entries.last() {
            Some(last) if last.id >= now => last.id.successor().ok_or_else(|| {
                StoreError::IdNotIncreasing {
                    id: now.to_string(),
                    top: last.id.to_string(),
                }
            })?,
            _ => now,
        };
        entries.push(StreamEntry::new(id, fields));
        drop(streams);

        self.appended.notify_waiters();
        Ok(id)
    }

    /// Append an entry with an explicit ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdNotIncreasing`] if `id` is not greater than
    /// the stream's last ID, or is `0-0`.
    pub async fn append_with_id<K, V>(
        &self,
        stream: &str,
        id: StreamId,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<StreamId, StoreError>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut streams = self.streams.write().await;
        let entries = streams.entry(stream.to_owned()).or_default();
        let top = entries.last().map_or(StreamId::ZERO, |last| last.id);
        if id <= top {
            return Err(StoreError::IdNotIncreasing {
                id: id.to_string(),
                top: top.to_string(),
            });
        }
        entries.push(StreamEntry::new(id, fields));
        drop(streams);

        self.appended.notify_waiters();
        Ok(id)
    }

    /// Append a pre-built entry, keeping its ID.
    ///
    /// Same ordering rules as [`append_with_id`](Self::append_with_id).
    pub async fn push_entry(&self, stream: &str, entry: StreamEntry) -> Result<(), StoreError> {
        let mut streams = self.streams.write().await;
        let entries = streams.entry(stream.to_owned()).or_default();
        let top = entries.last().map_or(StreamId::ZERO, |last| last.id);
        if entry.id <= top {
            return Err(StoreError::IdNotIncreasing {
                id: entry.id.to_string(),
                top: top.to_string(),
            });
        }
        entries.push(entry);
        drop(streams);

        self.appended.notify_waiters();
        Ok(())
    }

    /// Number of entries in `stream` (zero if it does not exist).
    pub async fn len(&self, stream: &str) -> usize {
        self.streams.read().await.get(stream).map_or(0, Vec::len)
    }

    /// Entries after `cursor`, capped at `count`.
    async fn collect_after(&self, stream: &str, cursor: StreamId, count: Option<u64>) -> Batch {
        let limit = count.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        let streams = self.streams.read().await;
        streams.get(stream).map_or_else(Vec::new, |entries| {
            // Entries are sorted by ID, so everything after the partition
            // point is newer than the cursor.
            let start = entries.partition_point(|entry| entry.id <= cursor);
            entries.iter().skip(start).take(limit).cloned().collect()
        })
    }
}

impl StreamReader for MemoryStreams {
    async fn read_after(
        &self,
        stream: &str,
        cursor: StreamId,
        options: ReadOptions,
    ) -> Result<Batch, StoreError> {
        let wait = async {
            loop {
                // Register for wakeups before looking, so an append that
                // lands between the check and the await is not missed.
                let notified = self.appended.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                let batch = self.collect_after(stream, cursor, options.count).await;
                if !batch.is_empty() {
                    return batch;
                }
                notified.await;
            }
        };

        Ok(tokio::time::timeout(options.block, wait)
            .await
            .unwrap_or_default())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
