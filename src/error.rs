//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The snapshot file couldn't be read.
    #[display("could not read snapshot: {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// The snapshot file isn't a valid snapshot.
    #[display("invalid snapshot: {}", _0.display())]
    Parse(#[error(not(source))] PathBuf),
    #[display("could not load preferences")]
    Config,
    #[display("library pipeline failed")]
    Pipeline,
    #[display("could not write output")]
    Output,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A snapshot that is being rewritten may be read mid-write.
        matches!(self, Self::Read(_) | Self::Parse(_))
    }
}
