//! Retry Error Types
//!
//! Both variants wrap the operation's most recent failure as a child frame,
//! so the underlying cause is never lost.

use derive_more::{Display, Error};

/// A retry error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for retried operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every permitted attempt failed.
    #[display("gave up after {attempts} attempt(s)")]
    Exhausted { attempts: u32 },
    /// The operation failed in a way the caller marked as not worth retrying.
    #[display("aborted after {attempts} attempt(s): error is not retryable")]
    Aborted { attempts: u32 },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The policy already spent its budget; retrying on top of it is the
        // caller's decision, not something this crate can recommend.
        false
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts } | Self::Aborted { attempts } => *attempts,
        }
    }
}
