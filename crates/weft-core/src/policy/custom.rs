use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use super::{BeforeRetryFn, RetryPolicy};
use crate::error::is_missing_operation;

type RequiredFn = Box<dyn Fn(u32, &(dyn StdError + 'static)) -> bool + Send + Sync>;
type IntervalFn = Box<dyn FnMut(u32) -> Duration + Send>;
type LogFn = Box<dyn Fn(&str) + Send + Sync>;

/// Policy assembled from optional callbacks.
///
/// Unset callbacks fall back to:
/// - `required`: `false` (no retry)
/// - `interval_for`: [`CustomPolicy::DEFAULT_INTERVAL`]
/// - `before_retry`, `log`: no-op (attach a sink via `with_log` to see
///   diagnostics)
///
/// The missing-operation sentinel is rejected before `required` is consulted.
#[derive(Default)]
pub struct CustomPolicy {
    required: Option<RequiredFn>,
    interval_for: Option<IntervalFn>,
    before_retry: Option<BeforeRetryFn>,
    log: Option<LogFn>,
}

impl CustomPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, &(dyn StdError + 'static)) -> bool + Send + Sync + 'static,
    {
        self.required = Some(Box::new(f));
        self
    }

    pub fn with_interval_for<F>(mut self, f: F) -> Self
    where
        F: FnMut(u32) -> Duration + Send + 'static,
    {
        self.interval_for = Some(Box::new(f));
        self
    }

    pub fn with_before_retry<F>(mut self, f: F) -> Self
    where
        F: FnMut(u32, &(dyn StdError + 'static)) + Send + 'static,
    {
        self.before_retry = Some(Box::new(f));
        self
    }

    pub fn with_log<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for CustomPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPolicy")
            .field("required", &self.required.is_some())
            .field("interval_for", &self.interval_for.is_some())
            .field("before_retry", &self.before_retry.is_some())
            .field("log", &self.log.is_some())
            .finish()
    }
}

impl<E> RetryPolicy<E> for CustomPolicy
where
    E: StdError + 'static,
{
    fn required(&self, attempt: u32, error: &E) -> bool {
        let error: &(dyn StdError + 'static) = error;
        if is_missing_operation(error) {
            return false;
        }
        match &self.required {
            Some(f) => f(attempt, error),
            None => false,
        }
    }

    fn interval_for(&mut self, attempt: u32) -> Duration {
        match self.interval_for.as_mut() {
            Some(f) => f(attempt),
            None => Self::DEFAULT_INTERVAL,
        }
    }

    fn before_retry(&mut self, attempt: u32, error: &E) {
        if let Some(f) = self.before_retry.as_mut() {
            let error: &(dyn StdError + 'static) = error;
            f(attempt, error);
        }
    }

    fn log(&self, message: &str) {
        if let Some(f) = &self.log {
            f(message);
        }
    }
}
