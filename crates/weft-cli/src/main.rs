use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use weft_core::{BackoffConfig, Retrier, RetryConfig, cancel};

/// Number of failures before the demo operation succeeds (`WEFT_FAILURES`).
const DEFAULT_FAILURES: u32 = 2;

#[derive(Debug, thiserror::Error)]
#[error("intentional failure (left={left})")]
struct FlakyError {
    left: u32,
}

/// Fails a fixed number of times, then greets.
struct Flaky {
    remaining_failures: AtomicU32,
}

impl Flaky {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }

    async fn greet(&self, name: &str) -> Result<String, FlakyError> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(FlakyError { left });
        }
        Ok(format!("Hello, {name}!"))
    }
}

fn load_config() -> Result<RetryConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(RetryConfig::load(path)?),
        None => Ok(RetryConfig {
            attempts: 5,
            backoff: Some(BackoffConfig::default()),
            log_prefix: Some("demo".into()),
            ..RetryConfig::default()
        }),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // (A) 設定とポリシー
    let config = load_config()?;
    info!(?config, "retry config loaded");
    let policy = config.build()?;

    // (B) Ctrl-C で待機中のリトライを打ち切る
    let (canceller, signal) = cancel::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("ctrl-c received, cancelling retry");
            canceller.cancel();
        }
    });

    // (C) 失敗し続ける operation をリトライ
    let failures = std::env::var("WEFT_FAILURES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_FAILURES);
    let flaky = Flaky::new(failures);

    let mut retrier = Retrier::new(policy).with_cancel(signal);
    match retrier.run(|| flaky.greet("weft")).await {
        Ok(greeting) => {
            info!(%greeting, "operation succeeded");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "operation gave up");
            Err(err.into())
        }
    }
}
