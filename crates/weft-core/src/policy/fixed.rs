use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{BeforeRetryFn, RetryPolicy};
use crate::error::is_missing_operation;
use crate::logs::{LogSink, SharedSink, TracingSink};

/// Fixed-count, fixed-interval policy.
///
/// Retries while `attempt < attempts`, waiting `interval` between calls.
/// Diagnostics go to a default [`TracingSink`] unless replaced with
/// [`FixedRetryPolicy::with_sink`] or dropped with
/// [`FixedRetryPolicy::without_sink`].
pub struct FixedRetryPolicy {
    /// Total number of calls allowed (including the first).
    pub attempts: u32,

    /// Wait between calls.
    pub interval: Duration,

    before_retry: Option<BeforeRetryFn>,
    sink: Option<SharedSink>,
}

impl FixedRetryPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts,
            interval,
            before_retry: None,
            sink: Some(TracingSink::default().shared()),
        }
    }

    /// Run `hook(attempt, previous_error)` before every retry.
    pub fn with_before_retry<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u32, &(dyn StdError + 'static)) + Send + 'static,
    {
        self.before_retry = Some(Box::new(hook));
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_sink_from<S: LogSink + 'static>(self, sink: S) -> Self {
        self.with_sink(Arc::new(sink))
    }

    /// Silence diagnostics; `log` becomes a no-op.
    pub fn without_sink(mut self) -> Self {
        self.sink = None;
        self
    }

    pub fn sink(&self) -> Option<&SharedSink> {
        self.sink.as_ref()
    }

    /// Attempt-count rule shared with [`super::BackoffRetryPolicy`].
    pub(crate) fn allows(&self, attempt: u32, error: &(dyn StdError + 'static)) -> bool {
        !is_missing_operation(error) && attempt < self.attempts
    }

    pub(crate) fn run_before_retry(&mut self, attempt: u32, error: &(dyn StdError + 'static)) {
        if let Some(hook) = self.before_retry.as_mut() {
            hook(attempt, error);
        }
    }

    pub(crate) fn emit(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink.log(message);
        }
    }
}

impl fmt::Debug for FixedRetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedRetryPolicy")
            .field("attempts", &self.attempts)
            .field("interval", &self.interval)
            .field("before_retry", &self.before_retry.is_some())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl<E> RetryPolicy<E> for FixedRetryPolicy
where
    E: StdError + 'static,
{
    fn required(&self, attempt: u32, error: &E) -> bool {
        self.allows(attempt, error)
    }

    fn interval_for(&mut self, _attempt: u32) -> Duration {
        self.interval
    }

    fn before_retry(&mut self, attempt: u32, error: &E) {
        self.run_before_retry(attempt, error);
    }

    fn log(&self, message: &str) {
        self.emit(message);
    }
}
