//! Structured identifiers for remote resources.
//!
//! A resource ID is a slash-delimited path rooted at an account:
//!
//! ```text
//! /subscriptions/{root}
//!     [/resourceGroups/{group}
//!         [/providers/{provider}/{type}/{name}
//!             [/{subType}/{subName}]]]
//! ```
//!
//! Provider and type segments are compared case-insensitively, as the remote API
//! does not preserve their casing consistently between writes and reads.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

const EXPECTED_FORMAT: &str = "/subscriptions/{root}[/resourceGroups/{group}\
[/providers/{provider}/{type}/{name}[/{subType}/{subName}]]]";

const ROOT_SEGMENTS: usize = 3;
const GROUP_SEGMENTS: usize = 5;
const RESOURCE_SEGMENTS: usize = 9;
const SUB_RESOURCE_SEGMENTS: usize = 11;

/// Errors produced while parsing or deriving resource IDs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceIdError {
    /// The input does not follow the canonical path layout.
    #[error("resource ID {input:?} does not match expected format {:?}", EXPECTED_FORMAT)]
    Format {
        /// The rejected input.
        input: String,
    },

    /// The input follows the layout but some segment is empty.
    #[error("resource ID {input:?} contains empty attributes")]
    EmptyAttributes {
        /// The rejected input.
        input: String,
    },

    /// An operation required a provider resource but got an account or group ID.
    #[error("resource ID {id:?} does not identify a provider resource")]
    NotAResource {
        /// The rendered ID that was used.
        id: String,
    },
}

impl ResourceIdError {
    fn format(input: &str) -> Self {
        Self::Format {
            input: input.to_string(),
        }
    }

    fn empty(input: &str) -> Self {
        Self::EmptyAttributes {
            input: input.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct ProviderResource {
    provider: String,
    resource_type: String,
    name: String,
    child: Option<(String, String)>,
}

/// Identifier of a remote resource.
///
/// Instances are valid by construction: a provider resource always has a resource
/// group, and a sub-resource always has a parent provider resource.
#[derive(Debug, Clone)]
pub struct ResourceId {
    root: String,
    group: Option<String>,
    resource: Option<ProviderResource>,
}

impl ResourceId {
    /// ID of an entire account.
    pub fn account(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            group: None,
            resource: None,
        }
    }

    /// ID of a resource group within an account.
    pub fn resource_group(root: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            group: Some(group.into()),
            resource: None,
        }
    }

    /// ID of a top-level resource exposed by a provider.
    pub fn resource(
        root: impl Into<String>,
        group: impl Into<String>,
        provider: impl Into<String>,
        resource_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            group: Some(group.into()),
            resource: Some(ProviderResource {
                provider: provider.into(),
                resource_type: resource_type.into(),
                name: name.into(),
                child: None,
            }),
        }
    }

    /// Derives the ID of a sub-resource nested directly under this resource.
    ///
    /// Any sub-resource already present on `self` is replaced.
    pub fn child(
        &self,
        sub_type: impl Into<String>,
        sub_name: impl Into<String>,
    ) -> Result<Self, ResourceIdError> {
        let Some(parent) = &self.resource else {
            return Err(ResourceIdError::NotAResource {
                id: self.to_string(),
            });
        };

        let mut resource = parent.clone();
        resource.child = Some((sub_type.into(), sub_name.into()));

        Ok(Self {
            root: self.root.clone(),
            group: self.group.clone(),
            resource: Some(resource),
        })
    }

    /// The account identifier the resource lives in.
    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn resource_group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| r.provider.as_str())
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| r.resource_type.as_str())
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| r.name.as_str())
    }

    pub fn sub_resource_type(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.child.as_ref())
            .map(|(t, _)| t.as_str())
    }

    pub fn sub_resource_name(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.child.as_ref())
            .map(|(_, n)| n.as_str())
    }

    /// Whether the ID designates a whole account rather than a group or resource.
    pub fn is_account(&self) -> bool {
        self.group.is_none() && self.resource.is_none()
    }

    /// Returns the resource group and the top-level resource name, the pair most
    /// management operations are addressed by.
    pub fn group_and_name(&self) -> Result<(&str, &str), ResourceIdError> {
        match (&self.group, &self.resource) {
            (Some(group), Some(resource)) => Ok((group.as_str(), resource.name.as_str())),
            _ => Err(ResourceIdError::NotAResource {
                id: self.to_string(),
            }),
        }
    }
}

impl PartialEq for ResourceId {
    fn eq(&self, other: &Self) -> bool {
        if self.root != other.root || self.group != other.group {
            return false;
        }

        match (&self.resource, &other.resource) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.provider.eq_ignore_ascii_case(&b.provider)
                    && a.resource_type.eq_ignore_ascii_case(&b.resource_type)
                    && a.name == b.name
                    && match (&a.child, &b.child) {
                        (None, None) => true,
                        (Some((at, an)), Some((bt, bn))) => at.eq_ignore_ascii_case(bt) && an == bn,
                        _ => false,
                    }
            }
            _ => false,
        }
    }
}

impl Eq for ResourceId {}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/subscriptions/{}", self.root)?;

        if let Some(group) = &self.group {
            write!(f, "/resourceGroups/{group}")?;
        }

        if let Some(r) = &self.resource {
            write!(f, "/providers/{}/{}/{}", r.provider, r.resource_type, r.name)?;
            if let Some((sub_type, sub_name)) = &r.child {
                write!(f, "/{sub_type}/{sub_name}")?;
            }
        }

        Ok(())
    }
}

impl FromStr for ResourceId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sections: Vec<&str> = s.split('/').collect();

        let n = sections.len();
        if !matches!(
            n,
            ROOT_SEGMENTS | GROUP_SEGMENTS | RESOURCE_SEGMENTS | SUB_RESOURCE_SEGMENTS
        ) {
            return Err(ResourceIdError::format(s));
        }

        if !sections[0].is_empty() || !sections[1].eq_ignore_ascii_case("subscriptions") {
            return Err(ResourceIdError::format(s));
        }
        if n >= GROUP_SEGMENTS && !sections[3].eq_ignore_ascii_case("resourceGroups") {
            return Err(ResourceIdError::format(s));
        }
        if n >= RESOURCE_SEGMENTS && !sections[5].eq_ignore_ascii_case("providers") {
            return Err(ResourceIdError::format(s));
        }

        if sections[1..].iter().any(|segment| segment.is_empty()) {
            return Err(ResourceIdError::empty(s));
        }

        let root = sections[2].to_string();
        let group = (n >= GROUP_SEGMENTS).then(|| sections[4].to_string());
        let resource = (n >= RESOURCE_SEGMENTS).then(|| ProviderResource {
            provider: sections[6].to_string(),
            resource_type: sections[7].to_string(),
            name: sections[8].to_string(),
            child: (n == SUB_RESOURCE_SEGMENTS)
                .then(|| (sections[9].to_string(), sections[10].to_string())),
        });

        Ok(Self {
            root,
            group,
            resource,
        })
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE_ACCOUNT: &str = "/subscriptions/00000000-0000-0000-0000-000000000000\
/resourceGroups/my-group/providers/Microsoft.Storage/storageAccounts/mystorage";

    #[test]
    fn parses_every_nesting_level() {
        let account: ResourceId = "/subscriptions/abc".parse().unwrap();
        assert!(account.is_account());
        assert_eq!(account.root_id(), "abc");
        assert_eq!(account.resource_group_name(), None);

        let group: ResourceId = "/subscriptions/abc/resourceGroups/rg".parse().unwrap();
        assert!(!group.is_account());
        assert_eq!(group.resource_group_name(), Some("rg"));
        assert_eq!(group.provider(), None);

        let resource: ResourceId = STORAGE_ACCOUNT.parse().unwrap();
        assert_eq!(resource.provider(), Some("Microsoft.Storage"));
        assert_eq!(resource.resource_type(), Some("storageAccounts"));
        assert_eq!(resource.resource_name(), Some("mystorage"));
        assert_eq!(resource.sub_resource_type(), None);

        let hub: ResourceId = "/subscriptions/abc/resourceGroups/rg/providers/Microsoft.EventHub\
/namespaces/ns/eventhubs/hub"
            .parse()
            .unwrap();
        assert_eq!(hub.resource_name(), Some("ns"));
        assert_eq!(hub.sub_resource_type(), Some("eventhubs"));
        assert_eq!(hub.sub_resource_name(), Some("hub"));
    }

    #[test]
    fn renders_the_parsed_input() {
        for input in [
            "/subscriptions/abc",
            "/subscriptions/abc/resourceGroups/rg",
            STORAGE_ACCOUNT,
            "/subscriptions/abc/resourceGroups/rg/providers/Microsoft.EventGrid/systemTopics/t\
/eventSubscriptions/s",
        ] {
            let id: ResourceId = input.parse().unwrap();
            assert_eq!(id.to_string(), input);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            "".parse::<ResourceId>(),
            Err(ResourceIdError::Format { .. })
        ));
        assert!(matches!(
            "subscriptions/abc".parse::<ResourceId>(),
            Err(ResourceIdError::Format { .. })
        ));
        assert!(matches!(
            "/subscriptions/abc/resourceGroups".parse::<ResourceId>(),
            Err(ResourceIdError::Format { .. })
        ));
        assert!(matches!(
            "/subscriptions/abc/groups/rg".parse::<ResourceId>(),
            Err(ResourceIdError::Format { .. })
        ));
        assert!(matches!(
            "/subscriptions//resourceGroups/rg".parse::<ResourceId>(),
            Err(ResourceIdError::EmptyAttributes { .. })
        ));
    }

    #[test]
    fn provider_and_type_segments_compare_case_insensitively() {
        let a: ResourceId = STORAGE_ACCOUNT.parse().unwrap();
        let b: ResourceId = STORAGE_ACCOUNT
            .replace("Microsoft.Storage/storageAccounts", "microsoft.storage/storageaccounts")
            .parse()
            .unwrap();
        assert_eq!(a, b);

        let c: ResourceId = STORAGE_ACCOUNT.replace("mystorage", "MyStorage").parse().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn child_copies_parent_fields() {
        let ns = ResourceId::resource("abc", "rg", "Microsoft.EventHub", "namespaces", "ns");
        let hub = ns.child("eventhubs", "hub").unwrap();

        assert_eq!(hub.root_id(), "abc");
        assert_eq!(hub.group_and_name().unwrap(), ("rg", "ns"));
        assert_eq!(
            hub.to_string(),
            "/subscriptions/abc/resourceGroups/rg/providers/Microsoft.EventHub/namespaces/ns/eventhubs/hub"
        );

        let group = ResourceId::resource_group("abc", "rg");
        assert!(matches!(
            group.child("eventhubs", "hub"),
            Err(ResourceIdError::NotAResource { .. })
        ));
    }

    #[test]
    fn serializes_as_canonical_string() {
        let id: ResourceId = STORAGE_ACCOUNT.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{STORAGE_ACCOUNT}\""));

        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<ResourceId>("\"/not/an/id\"").is_err());
    }
}
