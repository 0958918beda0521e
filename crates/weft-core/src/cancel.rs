//! Cancel - 協調的キャンセル信号
//!
//! The engine only observes the signal while waiting between attempts; an
//! operation that is already running always completes.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Create a linked canceller / signal pair.
pub fn channel() -> (Canceller, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (Canceller { tx }, CancelSignal { rx })
}

/// Trigger side of a cancellation pair.
///
/// Dropping the canceller without calling [`Canceller::cancel`] does not fire
/// the signal.
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

impl Canceller {
    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        // send_replace never fails, even with no receivers left
        self.tx.send_replace(true);
    }

    /// Fire the signal once `delay` elapses. The canceller stays usable, so
    /// [`Canceller::cancel`] can still fire it early. Dropping the returned
    /// handle does not stop the timer; abort it to disarm.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn cancel_after(&self, delay: Duration) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tx.send_replace(true);
        })
    }

    /// Another signal observing this canceller.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observer side of a cancellation pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fires. Never resolves if the canceller is
    /// dropped without firing.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_fires_all_signals() {
        let (canceller, signal) = channel();
        let other = signal.clone();
        let late = canceller.signal();

        assert!(!signal.is_cancelled());
        canceller.cancel();

        assert!(signal.is_cancelled());
        assert!(other.is_cancelled());
        assert!(late.is_cancelled());
        signal.cancelled().await;
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_when_already_fired() {
        let (canceller, signal) = channel();
        canceller.cancel();
        canceller.cancel();

        tokio::time::timeout(Duration::from_millis(50), signal.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fires_on_deadline() {
        let (canceller, signal) = channel();
        let started = tokio::time::Instant::now();
        let _timer = canceller.cancel_after(Duration::from_secs(3));

        signal.cancelled().await;
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_cancel_beats_pending_deadline() {
        let (canceller, signal) = channel();
        let started = tokio::time::Instant::now();
        let timer = canceller.cancel_after(Duration::from_secs(60));

        canceller.cancel();
        signal.cancelled().await;
        assert!(started.elapsed() < Duration::from_secs(60));

        // the timer firing later is harmless
        timer.await.unwrap();
        assert!(signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_timer_never_fires() {
        let (canceller, signal) = channel();
        canceller.cancel_after(Duration::from_secs(1)).abort();

        let waited = tokio::time::timeout(Duration::from_secs(5), signal.cancelled()).await;
        assert!(waited.is_err());
        assert!(!signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_canceller_never_fires() {
        let (canceller, signal) = channel();
        drop(canceller);

        let waited = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(waited.is_err());
        assert!(!signal.is_cancelled());
    }
}
