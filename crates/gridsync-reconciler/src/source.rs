//! Desired state of one event source.

use gridsync_core::{ResourceId, ResourceIdError};
use serde::{Deserialize, Serialize};

/// Sub-resource type of hubs inside a hub namespace.
pub const HUB_SUB_RESOURCE_TYPE: &str = "eventhubs";

/// An event source: routes events emitted for `spec.scope` into a delivery hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventGridSource {
    pub namespace: String,
    pub name: String,
    pub spec: EventGridSourceSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridSourceSpec {
    /// Resource whose events are routed.
    pub scope: ResourceId,
    /// Event types to subscribe to. `None` subscribes to every type available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<String>>,
    pub endpoint: HubEndpoint,
}

/// Where routed events are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEndpoint {
    /// ID of the hub namespace.
    pub namespace_id: ResourceId,
    /// Name of a user-managed hub. When absent, a hub is created and owned by
    /// the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_name: Option<String>,
}

impl EventGridSource {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, spec: EventGridSourceSpec) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            spec,
        }
    }

    /// Event types to write into the subscription filter. An empty list selects
    /// every available type.
    pub fn event_types(&self) -> Vec<String> {
        self.spec.event_types.clone().unwrap_or_default()
    }
}

impl HubEndpoint {
    /// ID of the user-managed hub, if one is configured.
    pub fn user_hub_id(&self) -> Option<Result<ResourceId, ResourceIdError>> {
        self.hub_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(|n| self.namespace_id.child(HUB_SUB_RESOURCE_TYPE, n))
    }
}
