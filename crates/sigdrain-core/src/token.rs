//! Read-only view of the shutdown cancellation token.

use tokio_util::sync::CancellationToken;

/// Observes whether the application should begin shutting down.
///
/// Only the coordinator's watcher can trigger cancellation; holders of this
/// handle can check or await it. Cancellation is permanent.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    inner: CancellationToken,
}

impl ShutdownToken {
    pub(crate) fn new(inner: CancellationToken) -> Self {
        Self { inner }
    }

    /// Check if shutdown has begun
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolve once shutdown has begun.
    /// Use this in `tokio::select!` alongside the task's own work.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await
    }

    /// A token that is cancelled with this one but can also be cancelled on
    /// its own without affecting the shutdown token.
    pub fn child_token(&self) -> CancellationToken {
        self.inner.child_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uncancelled() {
        let token = ShutdownToken::new(CancellationToken::new());
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_observes_cancellation() {
        let source = CancellationToken::new();
        let token = ShutdownToken::new(source.clone());
        let observer = token.clone();

        source.cancel();
        observer.cancelled().await;
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let source = CancellationToken::new();
        let token = ShutdownToken::new(source.clone());

        let child = token.child_token();
        child.cancel();
        assert!(!token.is_cancelled());

        let child = token.child_token();
        source.cancel();
        assert!(child.is_cancelled());
    }
}
