//! Retry policies: decide whether to retry, how long to wait, and where
//! diagnostics go.
//!
//! The engine talks to a policy only through [`RetryPolicy`]. Built-ins:
//! - [`FixedRetryPolicy`]: N attempts, constant interval
//! - [`BackoffRetryPolicy`]: N attempts, exponential interval
//! - [`CustomPolicy`]: every capability supplied as an optional callback
//! - [`NoRetry`]: a single attempt

pub mod backoff;
pub mod custom;
pub mod fixed;

pub use self::backoff::BackoffRetryPolicy;
pub use self::custom::CustomPolicy;
pub use self::fixed::FixedRetryPolicy;

use std::error::Error as StdError;
use std::time::Duration;

/// Hook run before attempts 2..N with the attempt about to run and the
/// previous error.
pub type BeforeRetryFn = Box<dyn FnMut(u32, &(dyn StdError + 'static)) + Send>;

/// The capability set the engine consults between attempts.
///
/// `attempt` is always the number of operation calls already completed.
/// None of these methods fail; policies report through return values only.
///
/// `interval_for` and `before_retry` take `&mut self`: a policy carrying
/// backoff state cannot be driven by two sessions at once.
pub trait RetryPolicy<E: ?Sized> {
    /// Whether another attempt is warranted after `attempt` failed with `error`.
    fn required(&self, attempt: u32, error: &E) -> bool;

    /// Wait before the next attempt.
    fn interval_for(&mut self, attempt: u32) -> Duration;

    /// Side effect run immediately before a retry (never before attempt 1).
    fn before_retry(&mut self, _attempt: u32, _error: &E) {}

    /// Emit a pre-formatted diagnostic line.
    fn log(&self, _message: &str) {}

    /// Called once at the start of every session, before the first attempt.
    /// Policies with per-session state (backoff progress) clear it here.
    fn start_session(&mut self) {}
}

impl<E, P> RetryPolicy<E> for Box<P>
where
    E: ?Sized,
    P: RetryPolicy<E> + ?Sized,
{
    fn required(&self, attempt: u32, error: &E) -> bool {
        (**self).required(attempt, error)
    }

    fn interval_for(&mut self, attempt: u32) -> Duration {
        (**self).interval_for(attempt)
    }

    fn before_retry(&mut self, attempt: u32, error: &E) {
        (**self).before_retry(attempt, error)
    }

    fn log(&self, message: &str) {
        (**self).log(message)
    }

    fn start_session(&mut self) {
        (**self).start_session()
    }
}

impl<E, P> RetryPolicy<E> for &mut P
where
    E: ?Sized,
    P: RetryPolicy<E> + ?Sized,
{
    fn required(&self, attempt: u32, error: &E) -> bool {
        (**self).required(attempt, error)
    }

    fn interval_for(&mut self, attempt: u32) -> Duration {
        (**self).interval_for(attempt)
    }

    fn before_retry(&mut self, attempt: u32, error: &E) {
        (**self).before_retry(attempt, error)
    }

    fn log(&self, message: &str) {
        (**self).log(message)
    }

    fn start_session(&mut self) {
        (**self).start_session()
    }
}

/// Run the operation once; never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl<E: ?Sized> RetryPolicy<E> for NoRetry {
    fn required(&self, _attempt: u32, _error: &E) -> bool {
        false
    }

    fn interval_for(&mut self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MissingOperation;

    #[test]
    fn no_retry_declines_everything() {
        let mut policy = NoRetry;
        assert!(!RetryPolicy::<MissingOperation>::required(&policy, 1, &MissingOperation));
        assert_eq!(RetryPolicy::<MissingOperation>::interval_for(&mut policy, 1), Duration::ZERO);
    }

    #[test]
    fn boxed_policy_delegates() {
        let mut policy: Box<dyn RetryPolicy<MissingOperation> + Send> =
            Box::new(FixedRetryPolicy::new(3, Duration::from_millis(5)));
        assert_eq!(
            RetryPolicy::<MissingOperation>::interval_for(&mut policy, 1),
            Duration::from_millis(5)
        );
        // the sentinel is never retryable
        assert!(!policy.required(1, &MissingOperation));
    }
}
