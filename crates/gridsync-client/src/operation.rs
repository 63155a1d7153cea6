//! Long-running remote operations.

use async_trait::async_trait;

use crate::ApiError;

/// Handle to a remote operation that completes asynchronously.
///
/// Writes on the remote API are accepted immediately and complete in the
/// background. The handle is awaited to completion within the same reconcile
/// pass and is never persisted.
#[async_trait]
pub trait Operation<T: Send>: Send {
    /// Waits for the operation to finish and returns its result.
    async fn wait(self: Box<Self>) -> Result<T, ApiError>;
}

/// An operation whose result is already known.
#[derive(Debug)]
pub struct Ready<T>(pub Result<T, ApiError>);

impl<T> Ready<T> {
    pub fn ok(value: T) -> Self {
        Self(Ok(value))
    }

    pub fn err(error: ApiError) -> Self {
        Self(Err(error))
    }
}

#[async_trait]
impl<T: Send + 'static> Operation<T> for Ready<T> {
    async fn wait(self: Box<Self>) -> Result<T, ApiError> {
        self.0
    }
}
