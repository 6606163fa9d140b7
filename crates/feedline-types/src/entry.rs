//! Stream entries as read from the backing log.
//!
//! Streams carry no schema: each entry is an arbitrary set of field/value
//! pairs. Values arrive from the store as raw bytes; most are UTF-8 text,
//! but nothing stops a producer from appending binary data. Such values are
//! kept as [`FieldValue::Binary`] and refuse to serialize, which is how an
//! unencodable entry surfaces at the wire layer.

use std::collections::BTreeMap;

use serde::ser::Error as _;
use serde::{Serialize, Serializer};

use crate::ids::StreamId;

/// A single field value of a stream entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// UTF-8 text.
    Text(String),
    /// Bytes that are not valid UTF-8.
    Binary(Vec<u8>),
}

impl FieldValue {
    /// Classify raw bytes from the store, keeping valid UTF-8 as text.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Binary(e.into_bytes()),
        }
    }

    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Binary(bytes) => Err(S::Error::custom(format!(
                "field value is not valid UTF-8 ({} bytes)",
                bytes.len()
            ))),
        }
    }
}

/// One record from a stream.
///
/// Fields are kept sorted by name so the wire encoding is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    /// Store-assigned identifier of this entry.
    pub id: StreamId,
    /// Field name to value mapping.
    pub fields: BTreeMap<String, FieldValue>,
}

impl StreamEntry {
    /// Build an entry from any iterator of field/value pairs.
    pub fn new<K, V>(id: StreamId, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            id,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An ordered run of entries returned by a single read. May be empty.
pub type Batch = Vec<StreamEntry>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bytes_become_text() {
        assert_eq!(
            FieldValue::from_bytes(b"hello".to_vec()),
            FieldValue::Text(String::from("hello"))
        );
        assert_eq!(
            FieldValue::from_bytes(vec![0xff, 0xfe]),
            FieldValue::Binary(vec![0xff, 0xfe])
        );
    }

    #[test]
    fn entry_fields_serialize_sorted() {
        let entry = StreamEntry::new(StreamId::new(1, 0), [("b", "2"), ("a", "1")]);
        let json = serde_json::to_string(&entry.fields).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn binary_value_refuses_to_serialize() {
        let mut entry = StreamEntry::new(StreamId::new(1, 0), [("k", "v")]);
        entry
            .fields
            .insert(String::from("blob"), FieldValue::Binary(vec![0xc3, 0x28]));
        assert!(serde_json::to_string(&entry.fields).is_err());
    }
}
