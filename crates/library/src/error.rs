//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
///
/// ### Configuration Errors
/// - [`ErrorKind::InvalidSortMode`]
/// - [`ErrorKind::UnknownCategory`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Source`]
/// - [`ErrorKind::Lookup`]
/// - [`ErrorKind::Pass`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A category's packed flags hold a sort mode that doesn't exist. This
    /// is a configuration bug, not something to recover from at runtime.
    #[display("invalid sort mode in category flags: {_0:#010b}")]
    InvalidSortMode(#[error(not(source))] u64),
    /// A library map holds a category that isn't in the category list it is
    /// being sorted against.
    #[display("library map references unknown category: {_0}")]
    UnknownCategory(#[error(not(source))] u64),
    /// One of the upstream library feeds failed.
    #[display("library source failed")]
    Source,
    /// A ranking query (read history, latest chapters, fetch dates) failed.
    #[display("ranking lookup failed")]
    Lookup,
    /// The blocking task running a pass panicked or was cancelled.
    #[display("library pass did not complete")]
    Pass,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source | Self::Lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::InvalidSortMode(0b0010_0000), "invalid sort mode in category flags: 0b00100000")]
    #[case(ErrorKind::UnknownCategory(7), "library map references unknown category: 7")]
    #[case(ErrorKind::Source, "library source failed")]
    fn test_error_kind_display(#[case] kind: ErrorKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn test_error_kind_retryable() {
        assert!(!ErrorKind::InvalidSortMode(0).is_retryable());
        assert!(!ErrorKind::UnknownCategory(1).is_retryable());
        assert!(ErrorKind::Source.is_retryable());
        assert!(ErrorKind::Lookup.is_retryable());
        assert!(!ErrorKind::Pass.is_retryable());
    }
}
