//! Repeated-error suppression.
//!
//! While the store is down every tick fails the same way. The client is
//! told once per distinct failure; identical failures after that are
//! swallowed until a poll succeeds.
//!
//! Failures are identified by kind *and* message, so two different
//! conditions that happen to render the same text are still reported.

use feedline_store::StoreErrorKind;

/// The most recently reported store failure of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastError {
    current: Option<(StoreErrorKind, String)>,
}

impl LastError {
    /// Record a failure. Returns the message to send if it differs from
    /// the last reported one, or `None` if it is a repeat.
    pub fn admit(&mut self, kind: StoreErrorKind, message: String) -> Option<String> {
        if let Some((last_kind, last_message)) = &self.current
            && *last_kind == kind
            && *last_message == message
        {
            return None;
        }
        self.current = Some((kind, message.clone()));
        Some(message)
    }

    /// Forget the last failure after a successful poll.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The message of the last reported failure, if any.
    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, message)| message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFUSED: StoreErrorKind = StoreErrorKind::Connection;

    #[test]
    fn identical_failures_are_reported_once() {
        let mut last = LastError::default();
        assert_eq!(
            last.admit(REFUSED, String::from("connection refused")),
            Some(String::from("connection refused"))
        );
        assert_eq!(last.admit(REFUSED, String::from("connection refused")), None);
        assert_eq!(last.message(), Some("connection refused"));
    }

    #[test]
    fn different_messages_are_both_reported() {
        let mut last = LastError::default();
        assert!(last.admit(REFUSED, String::from("connection refused")).is_some());
        assert!(last.admit(REFUSED, String::from("connection reset")).is_some());
    }

    #[test]
    fn same_text_from_different_kinds_is_reported() {
        let mut last = LastError::default();
        assert!(last.admit(REFUSED, String::from("oops")).is_some());
        assert!(last.admit(StoreErrorKind::Timeout, String::from("oops")).is_some());
    }

    #[test]
    fn clearing_allows_the_same_failure_again() {
        let mut last = LastError::default();
        assert!(last.admit(REFUSED, String::from("connection refused")).is_some());
        last.clear();
        assert_eq!(last.message(), None);
        assert!(last.admit(REFUSED, String::from("connection refused")).is_some());
    }
}
