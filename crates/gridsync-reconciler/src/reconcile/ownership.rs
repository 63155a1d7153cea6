//! Tag-based ownership of shared topics.

use std::collections::BTreeMap;

use gridsync_client::Topic;

use crate::source::EventGridSource;

pub const TAG_OWNER_RESOURCE: &str = "io.triggermesh_owner-resource";
pub const TAG_OWNER_NAMESPACE: &str = "io.triggermesh_owner-namespace";
pub const TAG_OWNER_NAME: &str = "io.triggermesh_owner-name";

/// Identity of a source, as written into topic tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerTags {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl OwnerTags {
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn for_source(kind: &str, source: &EventGridSource) -> Self {
        Self::new(kind, &source.namespace, &source.name)
    }

    /// Reads the owner from a tag map. `None` unless all three tags are present.
    pub fn from_tags(tags: &BTreeMap<String, String>) -> Option<Self> {
        Some(Self {
            kind: tags.get(TAG_OWNER_RESOURCE)?.clone(),
            namespace: tags.get(TAG_OWNER_NAMESPACE)?.clone(),
            name: tags.get(TAG_OWNER_NAME)?.clone(),
        })
    }

    pub fn to_tags(&self) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        self.apply_to(&mut tags);
        tags
    }

    /// Merges the owner tags into `tags`, keeping unrelated entries.
    pub fn apply_to(&self, tags: &mut BTreeMap<String, String>) {
        tags.insert(TAG_OWNER_RESOURCE.to_string(), self.kind.clone());
        tags.insert(TAG_OWNER_NAMESPACE.to_string(), self.namespace.clone());
        tags.insert(TAG_OWNER_NAME.to_string(), self.name.clone());
    }

    /// Removes every owner tag from `tags`.
    pub fn strip_from(tags: &mut BTreeMap<String, String>) {
        tags.remove(TAG_OWNER_RESOURCE);
        tags.remove(TAG_OWNER_NAMESPACE);
        tags.remove(TAG_OWNER_NAME);
    }
}

/// Relationship between a source and the topic routing its scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOwnership {
    /// No topic exists for the scope.
    Absent,
    /// At least one owner tag is missing. The topic may be adopted.
    Orphaned(Topic),
    OwnedBySelf(Topic),
    OwnedByOther(Topic),
}

impl TopicOwnership {
    pub fn classify(topic: Option<Topic>, owner: &OwnerTags) -> Self {
        let Some(topic) = topic else {
            return Self::Absent;
        };
        match OwnerTags::from_tags(&topic.tags) {
            None => Self::Orphaned(topic),
            Some(tagged) if tagged == *owner => Self::OwnedBySelf(topic),
            Some(_) => Self::OwnedByOther(topic),
        }
    }
}
