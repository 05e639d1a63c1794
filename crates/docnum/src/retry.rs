use core::time::Duration;
use std::error::Error;

/// Classifies an error as retryable or not.
///
/// [`RetryPolicy::run`] only replays operations whose failure is transient;
/// anything else aborts on first sight. Keeping this a one-method trait lets
/// the policy be tested independent of what it wraps.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// What the final failed attempt looked like.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum AttemptFailure<E: Error + 'static> {
    /// The attempt ran past its time bound and was abandoned.
    #[error("attempt timed out after {0:?}")]
    TimedOut(Duration),

    /// The attempt completed with a transient error.
    #[error(transparent)]
    Failed(E),
}

/// Terminal outcome of a retried operation.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum RetryError<E: Error + 'static> {
    /// Every attempt timed out or failed transiently. The enclosing unit of
    /// work should be aborted.
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        source: AttemptFailure<E>,
    },

    /// The operation failed with a non-transient error; retrying would not
    /// help and was not attempted.
    #[error("non-retryable failure: {0}")]
    Fatal(#[source] E),
}

/// Bounded retry with exponential backoff and a per-attempt time bound.
///
/// With the defaults (3 attempts, 1s initial delay) the sleeps between
/// attempts are 1s, 2s. Each attempt runs under [`tokio::time::timeout`];
/// a timeout counts as a transient failure. The wrapped operation is invoked
/// once per attempt and must therefore be safe to call more than once —
/// idempotent, or side-effect-free on its failure paths. That obligation
/// sits with the caller; the policy cannot enforce it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails fatally, or attempts are exhausted.
    ///
    /// `op` is called once per attempt; the delay before attempt `n + 1` is
    /// `initial_delay * 2^(n - 1)`.
    ///
    /// # Errors
    ///
    /// - [`RetryError::Fatal`] as soon as `op` returns a non-transient error
    /// - [`RetryError::Exhausted`] carrying the last attempt's failure once
    ///   `max_attempts` have been spent
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        E: Error + Transient + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        debug_assert!(self.max_attempts >= 1);
        let mut delay = self.initial_delay;
        let mut attempt = 1;
        loop {
            let failure = match tokio::time::timeout(self.attempt_timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_transient() => return Err(RetryError::Fatal(e)),
                Ok(Err(e)) => AttemptFailure::Failed(e),
                Err(_) => AttemptFailure::TimedOut(self.attempt_timeout),
            };

            if attempt >= self.max_attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: failure,
                });
            }

            tracing::warn!(attempt, ?delay, error = %failure, "retrying after transient failure");
            tokio::time::sleep(delay).await;
            delay *= 2;
            attempt += 1;
        }
    }
}
