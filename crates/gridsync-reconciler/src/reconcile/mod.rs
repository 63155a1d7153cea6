//! Topic, hub and subscription reconcilers.
//!
//! Each reconciler takes the desired source explicitly through [`PassContext`] and
//! returns the ID of the resource it ensured. Status bookkeeping is left to the
//! orchestrator.

mod equality;
mod hub;
mod ownership;
mod subscription;
mod topic;
mod topic_types;

pub use equality::equal_subscription;
pub use ownership::{
    OwnerTags, TAG_OWNER_NAME, TAG_OWNER_NAMESPACE, TAG_OWNER_RESOURCE, TopicOwnership,
};
pub use topic_types::{RegionKind, TopicTypeEntry, provider_and_resource_type, topic_type};

pub(crate) use hub::{ensure_hub, ensure_no_hub};
pub(crate) use subscription::{ensure_no_subscription, ensure_subscription};
pub(crate) use topic::{ensure_no_topic, ensure_topic, find_topic};

use std::fmt::Display;

use gridsync_client::{ApiError, Clients};
use gridsync_core::{ErrorClassifier, ErrorKind};

use crate::config::ReconcilerConfig;
use crate::error::ReconcileError;
use crate::events::EventRecorder;
use crate::remote::RemoteCall;
use crate::source::EventGridSource;

/// Everything one reconcile pass of one source needs.
pub(crate) struct PassContext<'a> {
    pub source: &'a EventGridSource,
    pub clients: &'a Clients,
    pub config: &'a ReconcilerConfig,
    pub events: &'a dyn EventRecorder,
    pub classifier: &'a ErrorClassifier,
    pub remote: RemoteCall,
}

impl PassContext<'_> {
    pub fn kind(&self, err: &ApiError) -> ErrorKind {
        self.classifier.classify(err)
    }

    /// Sanitized description of `err`, stable across retries.
    pub fn describe(&self, err: &ApiError) -> String {
        self.classifier.describe(err)
    }

    /// Converts a failed call of an apply step into a [`ReconcileError`]. Terminal
    /// kinds become permanent, everything else stays retriable.
    pub fn failure(&self, reason: &'static str, action: impl Display, err: ApiError) -> ReconcileError {
        let kind = self.kind(&err);
        let message = format!("Error {action}: {}", self.describe(&err));
        if kind.is_terminal() {
            ReconcileError::permanent(reason, message)
        } else {
            ReconcileError::transient(reason, message, err)
        }
    }

    /// Handles a failed call of a finalize step.
    ///
    /// A missing resource already satisfies the step and terminal kinds will not
    /// clear up, so both are reported under `done` or `failed` and swallowed.
    /// Anything else is returned for retry.
    pub fn tolerate(
        &self,
        done: &'static str,
        failed: &'static str,
        action: impl Display,
        err: ApiError,
    ) -> Result<(), ReconcileError> {
        match self.kind(&err) {
            ErrorKind::NotFound => {
                tracing::debug!(error = %err, "resource already gone");
                self.events
                    .warn(done, format!("Resource not found while {action}, skipping"));
                Ok(())
            }
            ErrorKind::AccessDenied | ErrorKind::NoCredentials => {
                self.events.warn(
                    failed,
                    format!("Access denied while {action}. Ignoring: {}", self.describe(&err)),
                );
                Ok(())
            }
            ErrorKind::Unclassified => Err(ReconcileError::transient(
                failed,
                format!("Error {action}: {}", self.describe(&err)),
                err,
            )),
        }
    }
}
