//! Resource types able to emit events through a topic.

/// Where a topic for a resource type must be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Same region as the scope resource.
    Regional,
    /// The pseudo-region `global`.
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTypeEntry {
    /// `<provider>.<resource type>`, lowercased.
    pub topic_type: String,
    pub region: RegionKind,
}

use RegionKind::{Global, Regional};

const TOPIC_TYPES: &[(&str, &str, RegionKind)] = &[
    ("microsoft.agfoodplatform", "farmbeats", Regional),
    ("microsoft.apimanagement", "service", Regional),
    ("microsoft.appconfiguration", "configurationstores", Regional),
    ("microsoft.cache", "redis", Regional),
    ("microsoft.communication", "communicationservices", Global),
    ("microsoft.containerregistry", "registries", Regional),
    ("microsoft.devices", "iothubs", Regional),
    ("microsoft.eventhub", "namespaces", Regional),
    ("microsoft.keyvault", "vaults", Regional),
    ("microsoft.machinelearningservices", "workspaces", Regional),
    ("microsoft.maps", "accounts", Global),
    ("microsoft.media", "mediaservices", Regional),
    ("microsoft.resources", "subscriptions", Global),
    ("microsoft.resources", "resourcegroups", Global),
    ("microsoft.servicebus", "namespaces", Regional),
    ("microsoft.signalrservice", "signalr", Regional),
    ("microsoft.storage", "storageaccounts", Regional),
    ("microsoft.web", "sites", Regional),
    ("microsoft.web", "serverfarms", Regional),
];

/// Looks up the topic type for a lowercased provider and resource type.
pub fn topic_type(provider: &str, resource_type: &str) -> Option<TopicTypeEntry> {
    TOPIC_TYPES
        .iter()
        .find(|(p, t, _)| *p == provider && *t == resource_type)
        .map(|(p, t, region)| TopicTypeEntry {
            topic_type: format!("{p}.{t}"),
            region: *region,
        })
}

/// Lowercased provider and resource type of a scope. Scopes without a provider
/// are either a whole account or a resource group.
pub fn provider_and_resource_type(scope: &gridsync_core::ResourceId) -> (String, String) {
    match (scope.provider(), scope.resource_type()) {
        (Some(provider), Some(resource_type)) => {
            (provider.to_lowercase(), resource_type.to_lowercase())
        }
        _ => {
            let resource_type = if scope.resource_group_name().is_some() {
                "resourcegroups"
            } else {
                "subscriptions"
            };
            ("microsoft.resources".to_string(), resource_type.to_string())
        }
    }
}
