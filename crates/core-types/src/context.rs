//! Cancellation and deadline propagation for I/O-bearing operations.
//!
//! A `Context` is threaded through every call that may touch a remote replica.
//! Wrapping a future in [`Context::run`] races it against the context's
//! cancellation signal and deadline, so a cancelled caller never waits for
//! the remote operation to finish.

use crate::error::ContextError;
use std::future::{Future, pending};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Carries an optional deadline and an optional cancellation signal.
///
/// Contexts are cheap to clone; clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: Option<watch::Receiver<bool>>,
}

/// The sending half returned by [`Context::with_cancel`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels every context derived from this handle.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a copy of this context that expires after `timeout`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Returns a cancellable copy of this context together with its handle.
    ///
    /// The new signal replaces any signal inherited from `self`.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancelled = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reports whether the context is already done, without waiting.
    pub fn err(&self) -> Option<ContextError> {
        if self.cancelled.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drives `fut` to completion unless the context is cancelled or its
    /// deadline passes first, in which case `fut` is dropped.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let mut cancelled = self.cancelled.clone();
        let cancel = async move {
            match cancelled.as_mut() {
                // A dropped handle can never cancel.
                Some(rx) => {
                    if rx.wait_for(|c| *c).await.is_err() {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };

        let deadline = self.deadline;
        let expire = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel => Err(ContextError::Cancelled),
            _ = expire => Err(ContextError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_context_runs_to_completion() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn deadline_aborts_pending_future() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let result = ctx.run(pending::<()>()).await;
        assert_eq!(result, Err(ContextError::DeadlineExceeded));
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn cancel_aborts_pending_future() {
        let (ctx, handle) = Context::background().with_cancel();
        let task = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.run(pending::<()>()).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        let result = task.await.unwrap();
        assert_eq!(result, Err(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn cancelled_context_does_not_start_work() {
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let mut started = false;
        let result = ctx.run(async { started = true }).await;
        assert_eq!(result, Err(ContextError::Cancelled));
        assert!(!started);
    }

    #[tokio::test]
    async fn dropped_handle_never_cancels() {
        let (ctx, handle) = Context::background().with_cancel();
        drop(handle);
        assert_eq!(ctx.run(async { "done" }).await, Ok("done"));
    }

    #[test]
    fn earlier_deadline_is_kept() {
        let now = Instant::now();
        let early = now + Duration::from_secs(1);
        let late = now + Duration::from_secs(10);

        let ctx = Context::background().with_deadline(early).with_deadline(late);
        assert_eq!(ctx.deadline(), Some(early));
    }
}
