//! Geocoding Error Types
//!
//! Lookup services report failures through these kinds. The resolver retries
//! [`ErrorKind::Transient`] failures and gives up on the first
//! [`ErrorKind::Permanent`] one; neither is ever surfaced past the resolver.

use derive_more::{Display, Error};

/// A lookup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeouts, rate limiting, dropped connections.
    #[display("transient lookup failure: {_0}")]
    Transient(#[error(not(source))] String),
    /// The request itself is bad; asking again will not help.
    #[display("permanent lookup failure: {_0}")]
    Permanent(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
