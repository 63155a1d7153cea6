//! Status record written back after each reconcile pass.

use std::fmt;

use gridsync_core::ResourceId;
use serde::{Deserialize, Serialize};

/// Why the source is not subscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusReason {
    /// Clients for the remote API could not be obtained.
    NoClient,
    TopicFailed,
    HubFailed,
    SubscriptionFailed,
}

impl StatusReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoClient => "NoClient",
            Self::TopicFailed => "TopicFailed",
            Self::HubFailed => "HubFailed",
            Self::SubscriptionFailed => "SubscriptionFailed",
        }
    }
}

impl fmt::Display for StatusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationStatus {
    pub subscribed: bool,
    #[serde(rename = "topicID", default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<ResourceId>,
    #[serde(rename = "hubID", default, skip_serializing_if = "Option::is_none")]
    pub hub_id: Option<ResourceId>,
    #[serde(rename = "subscriptionID", default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_reason: Option<StatusReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_message: Option<String>,
}

impl ReconciliationStatus {
    pub fn mark_subscribed(&mut self) {
        self.subscribed = true;
        self.last_error_reason = None;
        self.last_error_message = None;
    }

    pub fn mark_not_subscribed(&mut self, reason: StatusReason, message: impl Into<String>) {
        self.subscribed = false;
        self.last_error_reason = Some(reason);
        self.last_error_message = Some(message.into());
    }
}
