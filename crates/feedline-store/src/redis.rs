//! Redis/Dragonfly stream reads via `XREAD`.
//!
//! Each read is one `XREAD [COUNT n] BLOCK ms STREAMS <stream> <cursor>`
//! round trip. A blocking read occupies the connection it runs on for up
//! to `ms`, so the handle wraps a connection [`Pool`] rather than a single
//! multiplexed client; with more concurrent sessions than pooled
//! connections, reads queue behind each other on a connection.
//!
//! The pool reconnects without limit. While it is down, commands queue
//! inside the client, so every read carries its own deadline of the block
//! time plus [`READ_MARGIN`].

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use feedline_types::{Batch, FieldValue, StreamEntry, StreamId};
use fred::clients::Pool;
use fred::prelude::*;
use fred::types::Value;

use crate::error::StoreError;
use crate::reader::{ReadOptions, StreamReader};

/// Slack on top of the block time before a read is abandoned.
pub const READ_MARGIN: Duration = Duration::from_secs(1);

/// Decoded `XREAD` reply: stream name to `(id, fields)` pairs in log order.
type XReadReply = HashMap<String, Vec<(String, HashMap<String, Value>)>>;

/// Connection settings for [`RedisStreams::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    /// Redis URL, `redis://host:port` or `redis://host:port/db`.
    pub url: String,
    /// Number of pooled connections.
    pub pool_size: usize,
    /// Attempts per command before it fails back to the caller.
    pub max_retries: u32,
    /// First reconnect delay.
    pub min_backoff: Duration,
    /// Upper bound on the reconnect delay.
    pub max_backoff: Duration,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379/0"),
            pool_size: 4,
            max_retries: 10,
            min_backoff: Duration::from_millis(8),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

/// Pooled handle to a Redis-compatible server, read through `XREAD`.
#[derive(Clone)]
pub struct RedisStreams {
    pool: Pool,
}

impl RedisStreams {
    /// Connect to the server described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Redis`] if the connection fails.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, StoreError> {
        let config = Config::from_url(&settings.url)
            .map_err(|e| StoreError::Config(format!("invalid Redis URL: {e}")))?;

        let command_attempts = settings.max_retries.max(1);
        let pool = Builder::from_config(config)
            .set_policy(reconnect_policy(settings))
            .with_connection_config(|connection| {
                connection.max_command_attempts = command_attempts;
            })
            .build_pool(settings.pool_size.max(1))?;
        pool.init().await?;

        tracing::info!(pool_size = settings.pool_size, "Connected to Redis");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying [`Pool`].
    pub const fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl StreamReader for RedisStreams {
    async fn read_after(
        &self,
        stream: &str,
        cursor: StreamId,
        options: ReadOptions,
    ) -> Result<Batch, StoreError> {
        // BLOCK 0 means "forever" to Redis, so a zero wait omits BLOCK.
        let block = (!options.block.is_zero())
            .then(|| u64::try_from(options.block.as_millis()).unwrap_or(u64::MAX));

        let reply: Value = within_deadline(
            options.block,
            self.pool
                .xread(options.count, block, stream, cursor.to_string()),
        )
        .await?;

        decode_reply(stream, reply)
    }
}

/// Exponential backoff between the configured bounds, retried forever.
fn reconnect_policy(settings: &RedisSettings) -> ReconnectPolicy {
    ReconnectPolicy::new_exponential(
        0,
        clamp_millis(settings.min_backoff),
        clamp_millis(settings.max_backoff),
        2,
    )
}

/// Run a read, giving up `READ_MARGIN` after its block time.
async fn within_deadline<T, F>(block: Duration, read: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, fred::error::Error>>,
{
    let deadline = block.saturating_add(READ_MARGIN);
    match tokio::time::timeout(deadline, read).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_elapsed) => Err(StoreError::TimedOut(deadline)),
    }
}

/// Turn a raw `XREAD` reply into the entries of `stream`.
///
/// A blocking read that times out replies nil, which reads as empty.
fn decode_reply(stream: &str, reply: Value) -> Result<Batch, StoreError> {
    if reply.is_null() {
        return Ok(Vec::new());
    }
    let mut reply: XReadReply = reply.into_xread_response()?;
    reply
        .remove(stream)
        .unwrap_or_default()
        .into_iter()
        .map(|(id, fields)| decode_entry(&id, fields))
        .collect()
}

/// Turn one `(id, fields)` pair from the reply into a [`StreamEntry`].
fn decode_entry(id: &str, fields: HashMap<String, Value>) -> Result<StreamEntry, StoreError> {
    let id = id
        .parse::<StreamId>()
        .map_err(|e| StoreError::MalformedReply(e.to_string()))?;
    Ok(StreamEntry {
        id,
        fields: fields
            .into_iter()
            .map(|(name, value)| (name, field_value(value)))
            .collect(),
    })
}

/// Keep binary values as bytes; everything else is rendered as text.
fn field_value(value: Value) -> FieldValue {
    match value {
        Value::Bytes(bytes) => FieldValue::from_bytes(bytes.to_vec()),
        other => FieldValue::Text(other.as_string().unwrap_or_default()),
    }
}

fn clamp_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn array(values: Vec<Value>) -> Value {
        Value::Array(values)
    }

    #[test]
    fn nil_reply_is_an_empty_batch() {
        let batch = decode_reply("s", Value::Null).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn decodes_resp2_stream_reply() {
        // [[stream, [[id, [field, value, ...]], ...]]]
        let reply = array(vec![array(vec![
            Value::from("s"),
            array(vec![
                array(vec![
                    Value::from("1-0"),
                    array(vec![Value::from("k"), Value::from("v1")]),
                ]),
                array(vec![
                    Value::from("2-0"),
                    array(vec![Value::from("k"), Value::from("v2")]),
                ]),
            ]),
        ])]);

        let batch = decode_reply("s", reply).unwrap();
        let ids: Vec<_> = batch.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![StreamId::new(1, 0), StreamId::new(2, 0)]);
        assert_eq!(batch[1].fields["k"], FieldValue::from("v2"));
    }

    #[test]
    fn decodes_text_and_binary_fields() {
        let mut fields = HashMap::new();
        fields.insert(String::from("k"), Value::from("v1"));
        fields.insert(
            String::from("blob"),
            Value::Bytes(vec![0xff_u8, 0x00].into()),
        );
        fields.insert(String::from("n"), Value::Integer(7));

        let entry = decode_entry("1-0", fields).unwrap();
        assert_eq!(entry.id, StreamId::new(1, 0));
        assert_eq!(entry.fields["k"], FieldValue::from("v1"));
        assert_eq!(entry.fields["n"], FieldValue::from("7"));
        assert_eq!(entry.fields["blob"], FieldValue::Binary(vec![0xff, 0x00]));
    }

    #[test]
    fn rejects_entries_with_unparseable_ids() {
        let err = decode_entry("not-an-id", HashMap::new()).unwrap_err();
        assert!(matches!(err, StoreError::MalformedReply(_)));
    }

    #[test]
    fn reconnects_without_limit() {
        let settings = RedisSettings::default();
        assert_eq!(
            reconnect_policy(&settings),
            ReconnectPolicy::new_exponential(0, 8, 5000, 2)
        );
        assert_eq!(clamp_millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_read_times_out() {
        let block = Duration::from_millis(100);
        let stalled = std::future::pending::<Result<Value, fred::error::Error>>();

        let err = within_deadline(block, stalled).await.unwrap_err();

        assert!(matches!(err, StoreError::TimedOut(d) if d == block.saturating_add(READ_MARGIN)));
        assert_eq!(err.kind(), crate::StoreErrorKind::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_read_passes_through() {
        let done = async { Ok::<_, fred::error::Error>(Value::Null) };
        let reply = within_deadline(Duration::ZERO, done).await.unwrap();
        assert!(reply.is_null());
    }
}
