//! Type-level proof that an error was reported.

use std::fmt;

/// Proof that at least one error diagnostic was emitted.
///
/// Only [`DiagnosticQueue`](crate::queue::DiagnosticQueue) can create one,
/// so a function returning `Err(ErrorGuaranteed)` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Proof from an error count, for callers that tallied errors elsewhere.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}

impl std::error::Error for ErrorGuaranteed {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_error_count_returns_some_for_nonzero() {
        assert!(ErrorGuaranteed::from_error_count(1).is_some());
        assert!(ErrorGuaranteed::from_error_count(100).is_some());
    }

    #[test]
    fn from_error_count_returns_none_for_zero() {
        assert!(ErrorGuaranteed::from_error_count(0).is_none());
    }

    #[test]
    fn display_shows_error_message() {
        assert_eq!(ErrorGuaranteed::new().to_string(), "error(s) emitted");
    }
}
