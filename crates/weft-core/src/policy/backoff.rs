use std::error::Error as StdError;
use std::time::Duration;

use super::{FixedRetryPolicy, RetryPolicy};
use crate::backoff::Backoff;

/// Fixed-count policy whose interval grows exponentially.
///
/// Holds a plain [`FixedRetryPolicy`] for the attempt limit, hook and sink,
/// and only replaces the interval. The fixed policy's `interval` is the base
/// used to seed the backoff when `backoff.initial` is zero.
#[derive(Debug)]
pub struct BackoffRetryPolicy {
    pub policy: FixedRetryPolicy,
    pub backoff: Backoff,
}

impl BackoffRetryPolicy {
    pub fn new(policy: FixedRetryPolicy, backoff: Backoff) -> Self {
        Self { policy, backoff }
    }

    /// Clear backoff progress so the policy can drive a new session.
    pub fn reset(&mut self) {
        self.backoff.reset();
    }
}

impl<E> RetryPolicy<E> for BackoffRetryPolicy
where
    E: StdError + 'static,
{
    fn required(&self, attempt: u32, error: &E) -> bool {
        self.policy.allows(attempt, error)
    }

    fn interval_for(&mut self, _attempt: u32) -> Duration {
        self.backoff.next_interval(self.policy.interval)
    }

    fn before_retry(&mut self, attempt: u32, error: &E) {
        self.policy.run_before_retry(attempt, error);
    }

    fn log(&self, message: &str) {
        self.policy.emit(message);
    }

    fn start_session(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MissingOperation;

    #[derive(Debug, thiserror::Error)]
    #[error("E")]
    struct TestError;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn interval_follows_backoff_sequence() {
        let mut policy = BackoffRetryPolicy::new(
            FixedRetryPolicy::new(10, Duration::ZERO),
            Backoff::new(secs(1), secs(10), 2.0),
        );

        let seq: Vec<_> = (1..=5)
            .map(|attempt| RetryPolicy::<TestError>::interval_for(&mut policy, attempt))
            .collect();
        assert_eq!(seq, vec![secs(1), secs(2), secs(4), secs(8), secs(10)]);
    }

    #[test]
    fn lazily_seeds_initial_from_fixed_interval() {
        let mut policy = BackoffRetryPolicy::new(
            FixedRetryPolicy::new(10, Duration::from_millis(100)),
            Backoff::new(Duration::ZERO, secs(1), 2.0),
        );
        assert_eq!(policy.backoff.initial, Duration::ZERO);

        assert_eq!(
            RetryPolicy::<TestError>::interval_for(&mut policy, 1),
            Duration::from_millis(100)
        );
        assert_eq!(policy.backoff.initial, Duration::from_millis(100));
        assert_eq!(
            RetryPolicy::<TestError>::interval_for(&mut policy, 2),
            Duration::from_millis(200)
        );

        policy.reset();
        assert_eq!(
            RetryPolicy::<TestError>::interval_for(&mut policy, 1),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn start_session_clears_backoff_progress() {
        let mut policy = BackoffRetryPolicy::new(
            FixedRetryPolicy::new(10, Duration::ZERO),
            Backoff::new(secs(1), secs(10), 2.0),
        );
        RetryPolicy::<TestError>::interval_for(&mut policy, 1);
        RetryPolicy::<TestError>::interval_for(&mut policy, 2);

        RetryPolicy::<TestError>::start_session(&mut policy);
        assert_eq!(policy.backoff.current(), Duration::ZERO);
        assert_eq!(RetryPolicy::<TestError>::interval_for(&mut policy, 1), secs(1));
    }

    #[test]
    fn delegates_attempt_limit() {
        let policy = BackoffRetryPolicy::new(FixedRetryPolicy::new(2, Duration::ZERO), Backoff::default());
        assert!(policy.required(1, &TestError));
        assert!(!policy.required(2, &TestError));
        assert!(!policy.required(1, &MissingOperation));
    }
}
