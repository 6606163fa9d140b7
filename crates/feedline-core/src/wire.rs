//! Client-bound wire encoding.
//!
//! A successful poll is sent as one UTF-8 text frame holding a JSON array
//! with one object per entry, keyed by field name. Entry IDs are not part
//! of the payload.

use feedline_types::StreamEntry;
use serde::{Serialize, Serializer};

/// Payload sent in place of a batch that could not be encoded.
pub const PARSE_ERROR: &str = "parseError";

/// Borrowed view of a batch that serializes as an array of field maps.
struct WireBatch<'a>(&'a [StreamEntry]);

impl Serialize for WireBatch<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|entry| &entry.fields))
    }
}

/// Encode a batch as a JSON array of objects.
///
/// # Errors
///
/// Fails if any field value is not valid UTF-8.
pub fn encode_batch(batch: &[StreamEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireBatch(batch))
}
