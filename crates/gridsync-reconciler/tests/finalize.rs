mod support;

use std::collections::BTreeMap;

use gridsync_client::{SubscriptionProperties, Topic};
use gridsync_client_memory::{Call, CredentialsFault, Fault};
use gridsync_core::ResourceId;
use gridsync_reconciler::events::reason;
use gridsync_reconciler::reconcile::OwnerTags;
use gridsync_reconciler::{EventType, ReconcileError, ReconcilerConfig};
use support::*;

fn tags_of(name: &str) -> BTreeMap<String, String> {
    OwnerTags::new(ReconcilerConfig::default().ownership.kind, "default", name).to_tags()
}

async fn applied() -> Harness {
    let h = Harness::new();
    h.apply(&storage_source()).await.result.unwrap();
    h.grid.reset_calls();
    h.events.clear();
    h
}

#[tokio::test]
async fn sole_consumer_tears_everything_down() {
    let h = applied().await;
    let source = storage_source();

    h.finalize(&source).await.unwrap();

    assert!(h.grid.topics().is_empty());
    assert!(h.grid.hub(HUB_GROUP, HUB_NAMESPACE, &hub_name(&source)).is_none());
    assert_eq!(h.grid.calls(Call::SubscriptionDelete), 1);
    assert_eq!(h.grid.calls(Call::HubDelete), 1);
    assert_eq!(h.grid.calls(Call::TopicDelete), 1);
    assert_eq!(h.grid.calls(Call::TopicWrite), 0);

    assert_eq!(
        h.events.reasons(),
        vec![reason::UNSUBSCRIBED, reason::HUB_DELETED, reason::TOPIC_FINALIZED]
    );
    assert!(
        h.events
            .events()
            .iter()
            .all(|e| e.event_type == EventType::Normal)
    );
}

#[tokio::test]
async fn other_consumers_keep_topic_and_release_ownership() {
    let h = applied().await;
    let source = storage_source();
    let topic = topic_name(&source.spec.scope);
    h.grid.insert_subscription(
        SCOPE_GROUP,
        &topic,
        "someone-else",
        SubscriptionProperties::default(),
    );

    h.finalize(&source).await.unwrap();

    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
    assert_eq!(h.grid.calls(Call::TopicWrite), 1);
    assert!(h.grid.subscription(SCOPE_GROUP, &topic, &subscription_name(&source)).is_none());
    assert!(h.grid.subscription(SCOPE_GROUP, &topic, "someone-else").is_some());

    let remaining = h.grid.topic(SCOPE_GROUP, &topic).unwrap();
    assert_eq!(OwnerTags::from_tags(&remaining.tags), None);
    assert!(h.events.reasons().contains(&reason::TOPIC_FINALIZED));
}

#[tokio::test]
async fn released_topic_is_adopted_by_next_source() {
    let h = applied().await;
    let topic = topic_name(&storage_scope());
    let next = source_for(storage_scope(), "next");
    h.apply(&next).await.result.unwrap();

    h.finalize(&storage_source()).await.unwrap();
    let released = h.grid.topic(SCOPE_GROUP, &topic).unwrap();
    assert_eq!(OwnerTags::from_tags(&released.tags), None);

    h.grid.reset_calls();
    h.apply(&next).await.result.unwrap();
    assert_eq!(h.grid.calls(Call::TopicWrite), 1);

    let adopted = h.grid.topic(SCOPE_GROUP, &topic).unwrap();
    assert_eq!(OwnerTags::from_tags(&adopted.tags), OwnerTags::from_tags(&tags_of("next")));
}

#[tokio::test]
async fn foreign_owned_topic_is_left_untouched() {
    let grid = seeded_grid();
    let theirs = grid.insert_topic(
        SCOPE_GROUP,
        "shared-topic",
        Topic {
            location: REGION.to_string(),
            tags: tags_of("other"),
            source: storage_scope().to_string(),
            topic_type: "microsoft.storage.storageaccounts".to_string(),
            ..Default::default()
        },
    );
    grid.insert_subscription(
        SCOPE_GROUP,
        "shared-topic",
        "theirs",
        SubscriptionProperties::default(),
    );
    let h = Harness::with_grid(grid);
    let source = storage_source();
    h.apply(&source).await.result.unwrap();
    h.grid.reset_calls();

    h.finalize(&source).await.unwrap();

    assert_eq!(h.grid.calls(Call::TopicWrite), 0);
    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
    assert_eq!(h.grid.topic(SCOPE_GROUP, "shared-topic").unwrap().tags, theirs.tags);
    assert_eq!(h.grid.subscription_count(SCOPE_GROUP, "shared-topic"), 1);
}

#[tokio::test]
async fn missing_topic_skips_topic_calls() {
    let h = Harness::new();

    h.finalize(&storage_source()).await.unwrap();

    for call in Call::TOPIC_SCOPED {
        assert_eq!(h.grid.calls(call), 0, "{call:?}");
    }
    assert_eq!(h.grid.calls(Call::SubscriptionList), 0);
    // The hub is looked up by name, regardless of the topic.
    assert_eq!(h.grid.calls(Call::HubDelete), 1);

    let reasons = h.events.reasons();
    assert!(reasons.contains(&reason::UNSUBSCRIBED));
    assert!(reasons.contains(&reason::TOPIC_FINALIZED));
    assert!(!reasons.contains(&reason::HUB_DELETED));
}

#[tokio::test]
async fn finalize_twice_is_harmless() {
    let h = applied().await;
    let source = storage_source();

    h.finalize(&source).await.unwrap();
    h.finalize(&source).await.unwrap();

    assert!(h.grid.topics().is_empty());
}

#[tokio::test]
async fn denied_topic_listing_is_skipped() {
    let h = applied().await;
    h.grid.fail(Call::TopicList, Fault::Status(403));

    h.finalize(&storage_source()).await.unwrap();

    assert_eq!(h.grid.calls(Call::SubscriptionDelete), 0);
    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
    assert_eq!(h.grid.calls(Call::HubDelete), 1);

    let denied = &h.events.events()[0];
    assert_eq!(denied.event_type, EventType::Warning);
    assert_eq!(denied.reason, reason::FAILED_UNSUBSCRIBE);
    assert!(denied.message.starts_with("Access denied"));
}

#[tokio::test]
async fn denied_subscription_delete_is_skipped() {
    let h = applied().await;
    h.grid.fail(Call::SubscriptionDelete, Fault::Status(403));

    h.finalize(&storage_source()).await.unwrap();

    // Our subscription is still there, so the topic only loses its tags.
    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
    assert_eq!(h.grid.calls(Call::TopicWrite), 1);
    assert_eq!(h.grid.calls(Call::HubDelete), 1);
    assert!(h.events.reasons().contains(&reason::FAILED_UNSUBSCRIBE));
}

#[tokio::test]
async fn unclassified_topic_listing_failure_is_retriable() {
    let h = applied().await;
    h.grid.fail(Call::TopicList, Fault::Status(503));

    let err = h.finalize(&storage_source()).await.unwrap_err();

    assert!(err.is_retriable());
    assert_eq!(err.reason(), Some(reason::FAILED_TOPIC));
    assert_eq!(h.grid.writes(), 0);
}

#[tokio::test]
async fn unclassified_hub_delete_failure_is_retriable() {
    let h = applied().await;
    h.grid.fail(Call::HubDelete, Fault::Status(500));

    let err = h.finalize(&storage_source()).await.unwrap_err();

    assert!(err.is_retriable());
    assert_eq!(h.grid.calls(Call::SubscriptionDelete), 1);
    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
    assert_eq!(h.grid.topics().len(), 1);
}

#[tokio::test]
async fn failed_topic_delete_is_retriable() {
    let h = applied().await;
    h.grid.fail(Call::TopicDelete, Fault::Status(409));

    let err = h.finalize(&storage_source()).await.unwrap_err();
    assert!(err.is_retriable());
    assert_eq!(err.reason(), Some(reason::FAILED_TOPIC));

    h.grid.clear_faults();
    h.finalize(&storage_source()).await.unwrap();
    assert!(h.grid.topics().is_empty());
}

#[tokio::test]
async fn missing_credentials_do_not_block_deletion() {
    let h = applied().await;
    h.grid.fail_credentials(Some(CredentialsFault::Permanent));

    h.finalize(&storage_source()).await.unwrap();

    assert_eq!(h.grid.writes(), 0);
    assert_eq!(h.grid.calls(Call::TopicList), 0);
    assert_eq!(h.events.reasons(), vec![reason::FAILED_UNSUBSCRIBE]);
}

#[tokio::test]
async fn token_refresh_failure_is_retriable() {
    let h = applied().await;
    h.grid.fail_credentials(Some(CredentialsFault::TokenRefresh));

    let err = h.finalize(&storage_source()).await.unwrap_err();
    assert!(err.is_retriable());
    assert!(err.to_string().contains("Invalid client secret"));
}

#[tokio::test]
async fn user_supplied_hub_is_kept() {
    let h = Harness::new();
    let mut source = storage_source();
    source.spec.endpoint.hub_name = Some("my-hub".to_string());
    h.apply(&source).await.result.unwrap();
    h.grid.reset_calls();

    h.finalize(&source).await.unwrap();

    assert_eq!(h.grid.calls(Call::HubDelete), 0);
    assert_eq!(h.grid.calls(Call::TopicDelete), 1);
}

#[tokio::test]
async fn malformed_hub_namespace_fails_permanently() {
    let h = applied().await;
    let mut source = storage_source();
    source.spec.endpoint.namespace_id = ResourceId::account(ROOT);

    let err = h.finalize(&source).await.unwrap_err();

    assert!(matches!(err, ReconcileError::InvalidResourceId(_)));
    assert!(!err.is_retriable());
    // The subscription step runs first and is unaffected.
    assert_eq!(h.grid.calls(Call::SubscriptionDelete), 1);
    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
}

#[tokio::test]
async fn revoked_role_does_not_block_deletion() {
    let h = applied().await;
    h.grid.fail_credentials(Some(CredentialsFault::Forbidden));

    h.finalize(&storage_source()).await.unwrap();

    assert_eq!(h.grid.writes(), 0);
    assert_eq!(h.grid.calls(Call::TopicList), 0);
    let events = h.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Warning);
    assert_eq!(events[0].reason, reason::FAILED_UNSUBSCRIBE);
    assert!(events[0].message.contains("role assignment revoked"));
}

fn assert_topic_step_denied(h: &Harness) {
    let last = h.events.events().pop().unwrap();
    assert_eq!(last.event_type, EventType::Warning);
    assert_eq!(last.reason, reason::FAILED_TOPIC);
    assert!(last.message.starts_with("Access denied"));
}

#[tokio::test]
async fn denied_topic_delete_is_skipped() {
    let h = applied().await;
    h.grid.fail(Call::TopicDelete, Fault::Status(403));

    h.finalize(&storage_source()).await.unwrap();

    assert_eq!(h.grid.calls(Call::TopicDelete), 1);
    assert_eq!(h.grid.topics().len(), 1);
    assert_eq!(
        h.events.reasons(),
        vec![reason::UNSUBSCRIBED, reason::HUB_DELETED, reason::FAILED_TOPIC]
    );
    assert_topic_step_denied(&h);
}

#[tokio::test]
async fn denied_subscription_listing_is_skipped() {
    let h = applied().await;
    h.grid.fail(Call::SubscriptionList, Fault::Status(403));

    h.finalize(&storage_source()).await.unwrap();

    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
    assert_eq!(h.grid.calls(Call::TopicWrite), 0);
    assert_eq!(h.grid.topics().len(), 1);
    assert_topic_step_denied(&h);
}

#[tokio::test]
async fn denied_ownership_release_is_skipped() {
    let h = applied().await;
    let topic = topic_name(&storage_scope());
    h.grid.insert_subscription(
        SCOPE_GROUP,
        &topic,
        "someone-else",
        SubscriptionProperties::default(),
    );
    h.grid.fail(Call::TopicWrite, Fault::Status(403));

    h.finalize(&storage_source()).await.unwrap();

    assert_eq!(h.grid.calls(Call::TopicWrite), 1);
    assert_eq!(h.grid.calls(Call::TopicDelete), 0);
    let kept = h.grid.topic(SCOPE_GROUP, &topic).unwrap();
    assert_eq!(OwnerTags::from_tags(&kept.tags), OwnerTags::from_tags(&tags_of("blobs")));
    assert_topic_step_denied(&h);
}
