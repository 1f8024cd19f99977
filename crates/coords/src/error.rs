//! Coordinate Error Types
//!
//! Normalization itself never fails loudly: unparseable input is "no data".
//! These errors only surface through the [`FromStr`](std::str::FromStr)
//! implementations, where callers explicitly asked for a parse.

use derive_more::{Display, Error};

/// A coordinate error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for coordinate parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value was found but matches none of the accepted grammars.
    #[display("failed to parse {field}, found value: {value}")]
    ParseError {
        /// The component that failed to parse.
        field: &'static str,
        /// The offending input.
        value: String,
    },
    /// The value parsed but lies outside the valid range.
    #[display("{field} out of range: {value}")]
    OutOfRange {
        /// The component that was out of range.
        field: &'static str,
        /// The offending input.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Parsing is deterministic; the same input always fails the same way.
        false
    }
}
