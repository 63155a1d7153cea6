//! Errors returned by a reconcile pass.

use gridsync_client::ApiError;
use gridsync_core::ResourceIdError;

/// Outcome of a failed step, carrying the retry decision for the control loop.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Retrying is pointless until an operator intervenes.
    #[error("{message}")]
    Permanent {
        /// Notification reason code.
        reason: &'static str,
        message: String,
    },

    /// The remote API failed in a way that may clear up on its own.
    #[error("{message}")]
    Transient {
        /// Notification reason code.
        reason: &'static str,
        message: String,
        #[source]
        source: ApiError,
    },

    /// A stored or returned identifier could not be interpreted.
    #[error("converting resource ID string to structured resource ID: {0}")]
    InvalidResourceId(#[from] ResourceIdError),
}

impl ReconcileError {
    #[must_use]
    pub fn permanent(reason: &'static str, message: impl Into<String>) -> Self {
        Self::Permanent {
            reason,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transient(reason: &'static str, message: impl Into<String>, source: ApiError) -> Self {
        Self::Transient {
            reason,
            message: message.into(),
            source,
        }
    }

    /// Whether the control loop should retry with backoff.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Permanent { reason, .. } | Self::Transient { reason, .. } => Some(*reason),
            Self::InvalidResourceId(_) => None,
        }
    }
}
