//! Deadline and cancellation handling for remote calls.

use std::future::Future;
use std::time::Duration;

use gridsync_client::{ApiError, Operation};
use tokio_util::sync::CancellationToken;

/// Wraps every remote call of one reconcile pass.
#[derive(Debug, Clone)]
pub(crate) struct RemoteCall {
    timeout: Duration,
    cancel: CancellationToken,
}

impl RemoteCall {
    pub(crate) fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Runs a single call under the per-call deadline.
    pub(crate) async fn run<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ApiError::Cancelled),
            res = tokio::time::timeout(self.timeout, call) => {
                res.unwrap_or_else(|_| Err(ApiError::Timeout(self.timeout)))
            }
        }
    }

    /// Waits for a long-running operation. Only cancellation bounds the wait.
    pub(crate) async fn wait<T: Send>(&self, op: Box<dyn Operation<T>>) -> Result<T, ApiError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ApiError::Cancelled),
            res = op.wait() => res,
        }
    }
}
