//! weft-core
//!
//! Retry orchestration for arbitrary fallible async operations.
//!
//! # モジュール構成
//! - **engine**: リトライループ本体（`invoke`, `Retrier`）
//! - **policy**: 継続判定・待機時間・リトライ前処理・ログ出力の capability set
//! - **backoff**: 指数バックオフ（上限付き）
//! - **cancel**: 待機中だけ観測される協調的キャンセル
//! - **logs**: ポリシーが書き出す LogSink（tracing 連携）
//! - **config**: JSON 設定から組み込みポリシーを構築
//! - **error**: `RetryError`, `MissingOperation`

pub mod backoff;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod logs;
pub mod policy;

pub use backoff::Backoff;
pub use cancel::{CancelSignal, Canceller};
pub use config::{BackoffConfig, ConfigError, ConfiguredPolicy, RetryConfig};
pub use engine::{Retrier, invoke};
pub use error::{MissingOperation, RetryError, is_missing_operation};
pub use logs::{FnSink, LogLevel, LogSink, SharedSink, TracingSink};
pub use policy::{BackoffRetryPolicy, CustomPolicy, FixedRetryPolicy, NoRetry, RetryPolicy};
