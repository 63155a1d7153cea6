//! Topic reconciliation.
//!
//! At most one topic may exist per scope within a root account, whatever resource
//! group it lives in, so lookups always scan the whole account. Topics are shared:
//! the first source to create or adopt one tags itself as owner, and the topic is
//! only deleted once no subscription references it anymore.

use gridsync_client::Topic;
use gridsync_core::{ResourceId, checksum_name};

use super::ownership::{OwnerTags, TopicOwnership};
use super::topic_types::{RegionKind, provider_and_resource_type, topic_type};
use super::PassContext;
use crate::error::ReconcileError;
use crate::events::reason;

const GLOBAL_REGION: &str = "global";

/// Returns the topic whose source matches the scope of the desired source.
pub(crate) async fn find_topic(cx: &PassContext<'_>) -> Result<Option<Topic>, gridsync_client::ApiError> {
    let scope = cx.source.spec.scope.to_string();
    let mut continuation = None;

    loop {
        let page = cx
            .remote
            .run(cx.clients.topics.list_page(continuation.take()))
            .await?;

        if let Some(topic) = page
            .items
            .into_iter()
            .find(|t| t.source.eq_ignore_ascii_case(&scope))
        {
            return Ok(Some(topic));
        }

        match page.next {
            Some(next) => continuation = Some(next),
            None => return Ok(None),
        }
    }
}

/// Parses the server-assigned ID of a topic.
pub(crate) fn topic_resource_id(topic: &Topic) -> Result<ResourceId, ReconcileError> {
    Ok(topic.id.as_deref().unwrap_or_default().parse::<ResourceId>()?)
}

/// Ensures a topic exists for the scope and returns its ID.
#[tracing::instrument(skip_all, fields(scope = %cx.source.spec.scope))]
pub(crate) async fn ensure_topic(cx: &PassContext<'_>) -> Result<ResourceId, ReconcileError> {
    let scope = &cx.source.spec.scope;
    let owner = OwnerTags::for_source(&cx.config.ownership.kind, cx.source);

    let found = find_topic(cx).await.map_err(|e| {
        cx.failure(
            reason::FAILED_TOPIC,
            format_args!("finding topic for resource {:?}", scope.to_string()),
            e,
        )
    })?;

    match TopicOwnership::classify(found, &owner) {
        TopicOwnership::Absent => create_topic(cx, &owner).await,
        TopicOwnership::Orphaned(topic) => adopt_topic(cx, topic, &owner).await,
        TopicOwnership::OwnedBySelf(topic) | TopicOwnership::OwnedByOther(topic) => {
            topic_resource_id(&topic)
        }
    }
}

/// Tags an orphaned topic as owned by the current source. Concurrent adoption is
/// resolved by the remote API, last writer wins.
async fn adopt_topic(
    cx: &PassContext<'_>,
    mut topic: Topic,
    owner: &OwnerTags,
) -> Result<ResourceId, ReconcileError> {
    let id = topic_resource_id(&topic)?;
    let (group, name) = id.group_and_name()?;

    owner.apply_to(&mut topic.tags);

    let op = cx
        .remote
        .run(cx.clients.topics.create_or_update(group, name, topic))
        .await
        .map_err(|e| cx.failure(reason::FAILED_TOPIC, format_args!("updating topic {id}"), e))?;
    cx.remote
        .wait(op)
        .await
        .map_err(|e| cx.failure(reason::FAILED_TOPIC, format_args!("waiting for update of topic {id}"), e))?;

    tracing::info!(topic_id = %id, "adopted orphaned topic");
    cx.events
        .normal(reason::TOPIC_SYNCED, format!("Updated topic {id}, re-owned orphan"));

    Ok(id)
}

async fn create_topic(cx: &PassContext<'_>, owner: &OwnerTags) -> Result<ResourceId, ReconcileError> {
    let scope = &cx.source.spec.scope;
    let scope_str = scope.to_string();

    let (provider, resource_type) = provider_and_resource_type(scope);
    let Some(entry) = topic_type(&provider, &resource_type) else {
        return Err(ReconcileError::permanent(
            reason::FAILED_TOPIC,
            format!("No supported topic type for resource \"{provider}/{resource_type}\""),
        ));
    };

    // A location mismatch fails synchronously at creation, so regional topics
    // take the region of the scope resource.
    let location = match entry.region {
        RegionKind::Global => GLOBAL_REGION.to_string(),
        RegionKind::Regional => cx
            .remote
            .run(cx.clients.scopes.location(scope))
            .await
            .map_err(|e| {
                cx.failure(
                    reason::FAILED_TOPIC,
                    format_args!("getting region of resource {scope_str:?}"),
                    e,
                )
            })?,
    };

    let group = match scope.resource_group_name() {
        Some(group) => group.to_string(),
        None => {
            ensure_default_resource_group(cx).await?;
            cx.config.default_resource_group.name.clone()
        }
    };
    let name = checksum_name(&cx.config.naming.topic_prefix, &scope_str.to_lowercase());

    let desired = Topic {
        location,
        tags: owner.to_tags(),
        source: scope_str.clone(),
        topic_type: entry.topic_type,
        ..Default::default()
    };

    let op = cx
        .remote
        .run(cx.clients.topics.create_or_update(&group, &name, desired))
        .await
        .map_err(|e| {
            cx.failure(
                reason::FAILED_TOPIC,
                format_args!("creating topic for resource {scope_str:?}"),
                e,
            )
        })?;
    let created = cx.remote.wait(op).await.map_err(|e| {
        cx.failure(
            reason::FAILED_TOPIC,
            format_args!("waiting for creation of topic {name:?}"),
            e,
        )
    })?;

    let id = topic_resource_id(&created)?;
    tracing::info!(topic_id = %id, "created topic");
    cx.events.normal(
        reason::TOPIC_SYNCED,
        format!("Created topic {id} for resource {scope_str:?}"),
    );

    Ok(id)
}

/// Creates the resource group hosting topics of account-wide scopes if needed.
async fn ensure_default_resource_group(cx: &PassContext<'_>) -> Result<(), ReconcileError> {
    let group = &cx.config.default_resource_group;
    let action = format!("ensuring resource group {:?}", group.name);

    let exists = cx
        .remote
        .run(cx.clients.resource_groups.exists(&group.name))
        .await
        .map_err(|e| cx.failure(reason::FAILED_RESOURCE_GROUP, &action, e))?;
    if exists {
        return Ok(());
    }

    cx.remote
        .run(cx.clients.resource_groups.create(&group.name, &group.region))
        .await
        .map_err(|e| cx.failure(reason::FAILED_RESOURCE_GROUP, &action, e))?;

    tracing::info!(resource_group = %group.name, region = %group.region, "created resource group");
    cx.events.normal(
        reason::RESOURCE_GROUP_CREATED,
        format!("Created resource group {:?}", group.name),
    );
    Ok(())
}

/// Removes the current source's claim on the topic found for its scope.
///
/// The topic is deleted only when no subscription is left on it. Otherwise it
/// stays, and if the current source owns it, its owner tags are removed so that
/// another source may adopt it.
#[tracing::instrument(skip_all, fields(scope = %cx.source.spec.scope))]
pub(crate) async fn ensure_no_topic(cx: &PassContext<'_>, topic: Option<Topic>) -> Result<(), ReconcileError> {
    let Some(mut topic) = topic else {
        cx.events.warn(
            reason::TOPIC_FINALIZED,
            "Topic not found, skipping finalization".to_string(),
        );
        return Ok(());
    };

    let id = topic_resource_id(&topic)?;
    let (group, name) = id.group_and_name()?;

    // Only existence matters, a single item is enough.
    let remaining = match cx
        .remote
        .run(cx.clients.subscriptions.list_by_topic(group, name, 1))
        .await
    {
        Ok(page) => !page.items.is_empty() || page.next.is_some(),
        Err(e) => {
            return cx.tolerate(
                reason::TOPIC_FINALIZED,
                reason::FAILED_TOPIC,
                format_args!("listing subscriptions of topic {id}"),
                e,
            );
        }
    };

    if remaining {
        cx.events.warn(
            reason::TOPIC_FINALIZED,
            "Topic has remaining subscriptions, skipping deletion".to_string(),
        );

        let owner = OwnerTags::for_source(&cx.config.ownership.kind, cx.source);
        if OwnerTags::from_tags(&topic.tags).as_ref() != Some(&owner) {
            return Ok(());
        }

        OwnerTags::strip_from(&mut topic.tags);
        let op = match cx
            .remote
            .run(cx.clients.topics.create_or_update(group, name, topic))
            .await
        {
            Ok(op) => op,
            Err(e) => {
                return cx.tolerate(
                    reason::TOPIC_FINALIZED,
                    reason::FAILED_TOPIC,
                    format_args!("updating tags of topic {id}"),
                    e,
                );
            }
        };
        if let Err(e) = cx.remote.wait(op).await {
            return cx.tolerate(
                reason::TOPIC_FINALIZED,
                reason::FAILED_TOPIC,
                format_args!("waiting for update of topic {id}"),
                e,
            );
        }

        tracing::info!(topic_id = %id, "released ownership of topic");
        cx.events.normal(
            reason::TOPIC_FINALIZED,
            format!("Removed ownership tags on topic {id}"),
        );
        return Ok(());
    }

    let op = match cx.remote.run(cx.clients.topics.delete(group, name)).await {
        Ok(op) => op,
        Err(e) => {
            return cx.tolerate(
                reason::TOPIC_FINALIZED,
                reason::FAILED_TOPIC,
                format_args!("deleting topic {id}"),
                e,
            );
        }
    };
    if let Err(e) = cx.remote.wait(op).await {
        return cx.tolerate(
            reason::TOPIC_FINALIZED,
            reason::FAILED_TOPIC,
            format_args!("waiting for deletion of topic {id}"),
            e,
        );
    }

    tracing::info!(topic_id = %id, "deleted topic");
    cx.events
        .normal(reason::TOPIC_FINALIZED, format!("Deleted topic {id}"));
    Ok(())
}
