//! Stream entry identifiers used as read cursors.
//!
//! Every entry appended to a stream receives a store-assigned identifier of
//! the form `<milliseconds>-<sequence>`. The bridge uses the same value as
//! its read cursor: "give me everything after this ID". Identifiers are
//! produced by the store and forwarded verbatim; the bridge never invents
//! one except for the [`StreamId::ZERO`] start-of-stream sentinel.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a string is not a valid `<ms>-<seq>` stream ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stream ID {input:?}: expected <ms>-<seq>")]
pub struct ParseStreamIdError {
    /// The rejected input.
    pub input: String,
}

/// A composite stream entry identifier (`<ms>-<seq>`).
///
/// Ordering is lexicographic on `(ms, seq)`, which matches the order in
/// which a Redis-compatible store assigns IDs within a single stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StreamId {
    ms: u64,
    seq: u64,
}

impl StreamId {
    /// The start-of-stream sentinel (`0-0`). Reading after it returns every
    /// entry in the stream.
    pub const ZERO: Self = Self::new(0, 0);

    /// Build an identifier from its millisecond and sequence parts.
    pub const fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }

    /// The millisecond (time) part.
    pub const fn millis(self) -> u64 {
        self.ms
    }

    /// The sequence part.
    pub const fn sequence(self) -> u64 {
        self.seq
    }

    /// The smallest identifier strictly greater than `self`.
    ///
    /// Returns `None` only at `u64::MAX-u64::MAX`.
    pub const fn successor(self) -> Option<Self> {
        match self.seq.checked_add(1) {
            Some(seq) => Some(Self::new(self.ms, seq)),
            None => match self.ms.checked_add(1) {
                Some(ms) => Some(Self::new(ms, 0)),
                None => None,
            },
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

impl FromStr for StreamId {
    type Err = ParseStreamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseStreamIdError {
            input: s.to_owned(),
        };
        let (ms, seq) = s.split_once('-').ok_or_else(invalid)?;
        // u64::from_str accepts a leading '+', which the store never emits.
        if ms.starts_with('+') || seq.starts_with('+') {
            return Err(invalid());
        }
        let ms = ms.parse::<u64>().map_err(|_e| invalid())?;
        let seq = seq.parse::<u64>().map_err(|_e| invalid())?;
        Ok(Self::new(ms, seq))
    }
}

impl Serialize for StreamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StreamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
