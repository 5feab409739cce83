//! Cooperative cancellation passed from the host into connector calls.

use tokio::sync::watch;

/// Caller side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Connector side of a cancellation pair.
///
/// Clones observe the same handle. A signal whose handle is dropped without
/// cancelling never fires.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// Create a linked handle and signal.
    #[must_use]
    pub fn pair() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Self { rx: Some(rx) })
    }

    /// A signal that is never cancelled.
    #[must_use]
    pub const fn never() -> Self {
        Self { rx: None }
    }

    /// Returns `true` if cancellation has already been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancellation is requested; pending forever otherwise.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let (handle, signal) = CancelSignal::pair();
        assert!(!signal.is_cancelled());

        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { signal.cancelled().await }
        });
        handle.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancellation should be observed")
            .unwrap();
        assert!(signal.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_before_wait_is_observed() {
        let (handle, signal) = CancelSignal::pair();
        handle.cancel();
        drop(handle);

        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("already-cancelled signal should resolve");
    }

    #[tokio::test]
    async fn never_and_dropped_handles_stay_pending() {
        let never = CancelSignal::never();
        assert!(!never.is_cancelled());
        assert!(
            tokio::time::timeout(Duration::from_millis(20), never.cancelled())
                .await
                .is_err()
        );

        let (handle, signal) = CancelSignal::pair();
        drop(handle);
        assert!(
            tokio::time::timeout(Duration::from_millis(20), signal.cancelled())
                .await
                .is_err()
        );
    }
}
