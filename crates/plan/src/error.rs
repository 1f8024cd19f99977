//! Plan Error Types
//!
//! Planning itself degrades instead of failing; these cover the plumbing
//! around it.

use derive_more::{Display, Error};

/// A planning error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A metadata provider could not read a file.
    #[display("unable to read metadata: {_0}")]
    Metadata(#[error(not(source))] String),
    /// The background planning task panicked or was aborted.
    #[display("planning task did not complete")]
    Task,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Metadata(_))
    }
}
