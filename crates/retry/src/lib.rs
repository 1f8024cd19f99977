//! Bounded retry with exponential backoff.
//!
//! [`RetryPolicy`] runs a fallible async operation up to `max_attempts` times,
//! sleeping `base_delay * multiplier^(n-1)` between attempt `n` and `n + 1`.
//! With the defaults that is three attempts separated by 1s and 2s; no delay
//! follows the final attempt.
//!
//! The delay is a [`tokio::time::sleep`], so the calling task yields to the
//! runtime instead of blocking a thread.
//!
//! ```
//! use snapname_retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(policy.delay_for(1), Duration::from_secs(1));
//! assert_eq!(policy.delay_for(2), Duration::from_secs(2));
//! assert_eq!(policy.delay_for(3), Duration::from_secs(4));
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::Exn;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MULTIPLIER: u32 = 2;
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: u32,
    max_delay: Duration,
}
impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}
impl RetryPolicy {
    /// A zero `max_attempts` is treated as one: the operation always runs.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Run the operation exactly once.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier.max(1);
        self
    }

    /// Upper bound for any single delay, however many attempts have been made.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// The delay to wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.multiplier
            .checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Retries every failure until the attempt budget is spent.
    ///
    /// On exhaustion the final error is returned as an
    /// [`ErrorKind::Exhausted`] whose child frame is the operation's last
    /// failure.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T>
    where
        E: StdError + Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, Exn<E>>>,
    {
        self.execute_if(operation, |_| true).await
    }

    /// Like [`execute`](Self::execute), but stops early with
    /// [`ErrorKind::Aborted`] as soon as `should_retry` rejects an error.
    pub async fn execute_if<T, E, F, Fut, P>(&self, mut operation: F, should_retry: P) -> Result<T>
    where
        E: StdError + Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, Exn<E>>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 1;
        loop {
            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retrying");
                    }
                    return Ok(value);
                },
                Err(err) => err,
            };
            let cause: &E = &err;
            if !should_retry(cause) {
                warn!(attempt, error = %cause, "Operation failed with a non-retryable error");
                return Err(err.raise(ErrorKind::Aborted { attempts: attempt }));
            }
            if attempt >= self.max_attempts {
                warn!(attempt, error = %cause, "Operation failed; no attempts left");
                return Err(err.raise(ErrorKind::Exhausted { attempts: attempt }));
            }
            let delay = self.delay_for(attempt);
            warn!(attempt, max_attempts = self.max_attempts, ?delay, error = %cause, "Operation failed; retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use derive_more::{Display, Error};
    use rstest::rstest;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, Display, Error, PartialEq, Eq)]
    enum Flaky {
        #[display("timed out")]
        Timeout,
        #[display("bad request")]
        BadRequest,
    }

    /// An operation that fails with `failure` for the first `failures` calls.
    fn failing(
        calls: &AtomicU32,
        failures: u32,
        failure: fn() -> Flaky,
    ) -> impl FnMut() -> std::future::Ready<std::result::Result<u32, Exn<Flaky>>> + '_ {
        move || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if call <= failures { Err(Exn::from(failure())) } else { Ok(call) })
        }
    }

    #[rstest]
    #[case(1, Duration::from_secs(1))]
    #[case(2, Duration::from_secs(2))]
    #[case(3, Duration::from_secs(4))]
    #[case(7, Duration::from_secs(60))]
    #[case(u32::MAX, Duration::from_secs(60))]
    fn test_delay_for(#[case] attempt: u32, #[case] expected: Duration) {
        assert_eq!(RetryPolicy::default().delay_for(attempt), expected);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        assert_eq!(RetryPolicy::new(0, DEFAULT_BASE_DELAY).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_without_delay() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let value = RetryPolicy::default().execute(failing(&calls, 0, || Flaky::Timeout)).await.unwrap();
        assert_eq!(value, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let value = RetryPolicy::default().execute(failing(&calls, 2, || Flaky::Timeout)).await.unwrap();
        assert_eq!(value, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_error() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let err = RetryPolicy::default().execute(failing(&calls, u32::MAX, || Flaky::Timeout)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Exhausted { attempts: 3 });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s; nothing after the final attempt.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_aborts_immediately() {
        let calls = AtomicU32::new(0);
        let err = RetryPolicy::default()
            .execute_if(failing(&calls, u32::MAX, || Flaky::BadRequest), |e| *e == Flaky::Timeout)
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Aborted { attempts: 1 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_never_sleeps() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let err = RetryPolicy::none().execute(failing(&calls, u32::MAX, || Flaky::Timeout)).await.unwrap_err();
        assert_eq!(err.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
