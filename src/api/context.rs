//! Per-call cancellation and deadlines.
//!
//! Every operation takes a [`Context`]. The dispatcher races the transport
//! against it, so a cancelled or expired context aborts the in-flight request
//! whether it is still connecting or already waiting on the response.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{ApiError, Result};

/// Cancellation signal and optional deadline for a single call.
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

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Observe an externally owned cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a context that is cancelled whenever this one is, optionally
    /// with a tighter deadline.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout) {
            (Some(parent), Some(timeout)) => Some(parent.min(Instant::now() + timeout)),
            (None, Some(timeout)) => Some(Instant::now() + timeout),
            (parent, None) => parent,
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `future` to completion unless the context is cancelled or its
    /// deadline passes first.
    pub async fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let guarded = async {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => Err(ApiError::Cancelled),
                out = future => out,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(ApiError::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = Context::background();
        let out = ctx.run(async { Ok(7) }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn test_already_cancelled_short_circuits() {
        let ctx = Context::background();
        ctx.cancel();
        let err = ctx.run(async { Ok(1) }).await.unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_while_pending() {
        let token = CancellationToken::new();
        let ctx = Context::with_cancellation(token.clone());
        let handle = tokio::spawn(async move {
            ctx.run(std::future::pending::<Result<()>>()).await
        });
        token.cancel();
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = Context::with_timeout(Duration::from_millis(20));
        let err = ctx
            .run(std::future::pending::<Result<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let ctx = Context::with_timeout(Duration::from_secs(5));
        let err = ctx
            .run(async { Err::<(), _>(ApiError::Decode("bad".to_string())) })
            .await
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_child_follows_parent_cancellation() {
        let parent = Context::background();
        let child = parent.child(None);
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_keeps_tighter_deadline() {
        let parent = Context::with_timeout(Duration::from_secs(1));
        let child = parent.child(Some(Duration::from_secs(60)));
        assert_eq!(child.deadline(), parent.deadline());
    }
}
