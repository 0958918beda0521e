//! Retry engine: call → decide → wait → call again.
//!
//! # フロー
//! 1. operation が無ければ即座に `MissingOperation`（policy は一切呼ばない）
//! 2. attempt > 1 なら `before_retry`
//! 3. operation 実行、成功なら返す
//! 4. `required` が false なら最後のエラーを返す
//! 5. `interval_for` だけ待つ（キャンセルされたら最後のエラーを返す）

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::cancel::CancelSignal;
use crate::error::RetryError;
use crate::policy::RetryPolicy;

/// Run `operation` until it succeeds, the policy declines, or `cancel` fires
/// during a wait.
///
/// - `attempt` passed to the policy is the number of calls already completed.
/// - The operation is never called concurrently with itself.
/// - On every failure path the last operation error is returned; cancellation
///   does not produce a distinct error.
/// - A running operation is never preempted by cancellation.
///
/// A "not warranted" line is logged on every declined failure, including the
/// first attempt. [`RetryPolicy::start_session`] runs once before the first
/// attempt, so backoff progress never carries over between calls.
pub async fn invoke<T, E, P, F, Fut>(
    policy: &mut P,
    operation: Option<F>,
    cancel: Option<&CancelSignal>,
) -> Result<T, RetryError<E>>
where
    P: RetryPolicy<E> + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let Some(mut operation) = operation else {
        return Err(RetryError::missing_operation());
    };
    policy.start_session();

    let mut attempt: u32 = 1;
    let mut last_error: Option<E> = None;

    loop {
        if let Some(prev) = &last_error {
            policy.before_retry(attempt, prev);
        }

        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    policy.log(&format!("success on attempt #{attempt}"));
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        policy.log(&format!("failed with error [{error}] on attempt #{attempt}"));

        if !policy.required(attempt, &error) {
            policy.log(&format!(
                "retry for error [{error}] is not warranted after {attempt} attempt(s)"
            ));
            return Err(RetryError::Operation(error));
        }

        let interval = policy.interval_for(attempt);
        policy.log(&format!(
            "retry for error [{error}] is warranted after {attempt} attempt(s). the retry will begin after {interval:?}"
        ));

        if let Wait::Cancelled = wait(interval, cancel).await {
            policy.log(&format!(
                "retry for error [{error}] cancelled after {attempt} attempt(s)"
            ));
            return Err(RetryError::Operation(error));
        }

        last_error = Some(error);
        attempt = next_attempt(attempt);
    }
}

/// The counter saturates at `u32::MAX`; a policy that never declines keeps
/// seeing `u32::MAX` instead of overflowing.
fn next_attempt(attempt: u32) -> u32 {
    attempt.saturating_add(1)
}

enum Wait {
    Elapsed,
    Cancelled,
}

/// Sleep for `interval`, waking early if `cancel` fires.
async fn wait(interval: Duration, cancel: Option<&CancelSignal>) -> Wait {
    let Some(signal) = cancel else {
        tokio::time::sleep(interval).await;
        return Wait::Elapsed;
    };

    // biased: an already-fired signal wins over a zero interval
    tokio::select! {
        biased;
        _ = signal.cancelled() => Wait::Cancelled,
        _ = tokio::time::sleep(interval) => Wait::Elapsed,
    }
}

/// A policy bundled with an optional cancel signal.
///
/// ```ignore
/// let mut retrier = Retrier::new(FixedRetryPolicy::new(3, Duration::from_millis(100)))
///     .with_cancel(signal);
/// let body = retrier.run(|| client.fetch()).await?;
/// ```
#[derive(Debug)]
pub struct Retrier<P> {
    policy: P,
    cancel: Option<CancelSignal>,
}

impl<P> Retrier<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn into_policy(self) -> P {
        self.policy
    }

    /// See [`invoke`].
    pub async fn run<T, E, F, Fut>(&mut self, operation: F) -> Result<T, RetryError<E>>
    where
        P: RetryPolicy<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        invoke(&mut self.policy, Some(operation), self.cancel.as_ref()).await
    }
}
