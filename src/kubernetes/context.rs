//! Cancellable call context
//!
//! Every API call takes a [`Context`]. It carries a cancellation signal and an
//! optional deadline; whichever fires first stops the call.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::CancelReason;

/// Cancellation signal plus optional deadline for a call.
///
/// Clones share the same signal: cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now. A timeout too large to
    /// represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that is cancelled with `self` but can also be
    /// cancelled on its own. The earlier of both deadlines applies.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.and_then(|t| Instant::now().checked_add(t));
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> CancelReason {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => CancelReason::Cancelled,
                _ = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CancelReason::Cancelled
            }
        }
    }

    /// Run `fut` until it completes or the context is done, whichever
    /// comes first. A context that is already done never polls `fut`.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, CancelReason>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            reason = self.done() => Err(reason),
            output = fut => Ok(output),
        }
    }
}
