//! Errors - リトライ実行のエラー型

use std::error::Error as StdError;

use thiserror::Error;

/// Sentinel error: `invoke` was called without an operation.
///
/// Retrying a missing operation can never succeed, so every built-in policy
/// treats this error (anywhere in a source chain) as non-retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no operation was supplied")]
pub struct MissingOperation;

/// Error returned by the retry engine.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// No operation was given; nothing was attempted.
    #[error("{0}")]
    MissingOperation(#[source] MissingOperation),

    /// The last error returned by the operation.
    #[error(transparent)]
    Operation(E),
}

impl<E> RetryError<E> {
    pub fn missing_operation() -> Self {
        RetryError::MissingOperation(MissingOperation)
    }

    pub fn is_missing_operation(&self) -> bool {
        matches!(self, RetryError::MissingOperation(_))
    }

    /// Borrow the operation error, if any.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            RetryError::Operation(e) => Some(e),
            RetryError::MissingOperation(_) => None,
        }
    }

    pub fn into_operation_error(self) -> Option<E> {
        match self {
            RetryError::Operation(e) => Some(e),
            RetryError::MissingOperation(_) => None,
        }
    }
}

/// Returns true when `error` or any of its sources is [`MissingOperation`].
///
/// Walking the chain matters for nested retries: an outer operation that is
/// itself an `invoke` call surfaces the inner sentinel as its source.
pub fn is_missing_operation(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if e.is::<MissingOperation>() {
            return true;
        }
        current = e.source();
    }
    false
}
