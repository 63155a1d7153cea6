//! Subscription reconciliation.

use gridsync_client::{
    DeliverySchema, Destination, RetryPolicy, Subscription, SubscriptionFilter,
    SubscriptionProperties, Topic,
};
use gridsync_core::{ErrorKind, ResourceId, deterministic_name};

use super::equality::equal_subscription;
use super::topic::topic_resource_id;
use super::PassContext;
use crate::error::ReconcileError;
use crate::events::reason;

pub(crate) fn subscription_name(cx: &PassContext<'_>) -> String {
    deterministic_name(
        &cx.source.namespace,
        &cx.source.name,
        &cx.config.naming.subscription_prefix,
    )
}

/// Desired configuration of the subscription delivering to `hub_id`.
///
/// Fields the remote API would default on creation are set explicitly so that
/// comparing with the observed configuration is meaningful.
pub(crate) fn desired_subscription(cx: &PassContext<'_>, hub_id: &ResourceId) -> Subscription {
    Subscription {
        properties: SubscriptionProperties {
            destination: Some(Destination {
                hub_id: hub_id.to_string(),
            }),
            filter: Some(SubscriptionFilter {
                included_event_types: Some(cx.source.event_types()),
                subject_begins_with: Some(String::new()),
                subject_ends_with: Some(String::new()),
            }),
            retry_policy: Some(RetryPolicy {
                max_delivery_attempts: cx.config.delivery.max_attempts,
                event_ttl_minutes: cx.config.delivery.event_ttl_minutes,
            }),
            delivery_schema: Some(DeliverySchema::CloudEventV1_0),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn subscription_resource_id(subscription: &Subscription) -> Result<ResourceId, ReconcileError> {
    Ok(subscription
        .id
        .as_deref()
        .unwrap_or_default()
        .parse::<ResourceId>()?)
}

/// Ensures a subscription binds the topic to the hub with the desired
/// configuration. Writes only when the observed configuration differs.
#[tracing::instrument(skip_all, fields(topic_id = %topic_id, hub_id = %hub_id))]
pub(crate) async fn ensure_subscription(
    cx: &PassContext<'_>,
    topic_id: &ResourceId,
    hub_id: &ResourceId,
) -> Result<ResourceId, ReconcileError> {
    let (group, topic) = topic_id.group_and_name()?;
    let name = subscription_name(cx);

    let current = match cx
        .remote
        .run(cx.clients.subscriptions.get(group, topic, &name))
        .await
    {
        Ok(subscription) => Some(subscription),
        Err(e) if cx.kind(&e) == ErrorKind::NotFound => None,
        Err(e) => {
            return Err(cx.failure(
                reason::FAILED_SUBSCRIBE,
                format_args!("getting subscription from topic {topic_id}"),
                e,
            ));
        }
    };

    let desired = desired_subscription(cx, hub_id);

    if let Some(current) = &current {
        if equal_subscription(&desired.properties, &current.properties) {
            tracing::debug!(subscription = %name, "subscription up to date");
            return subscription_resource_id(current);
        }
    }

    let exists = current.is_some();
    let verb = if exists { "updating" } else { "creating" };

    let op = cx
        .remote
        .run(cx.clients.subscriptions.create_or_update(group, topic, &name, desired))
        .await
        .map_err(|e| {
            cx.failure(
                reason::FAILED_SUBSCRIBE,
                format_args!("{verb} subscription in topic {topic_id}"),
                e,
            )
        })?;
    let result = cx.remote.wait(op).await.map_err(|e| {
        cx.failure(
            reason::FAILED_SUBSCRIBE,
            format_args!("waiting for subscription {name:?}"),
            e,
        )
    })?;

    let id = subscription_resource_id(&result)?;
    let done = if exists { "Updated" } else { "Created" };
    tracing::info!(subscription_id = %id, action = done, "subscription synced");
    cx.events
        .normal(reason::SUBSCRIBED, format!("{done} subscription {id}"));

    Ok(id)
}

/// Deletes the current source's subscription from the topic, if there is one.
#[tracing::instrument(skip_all)]
pub(crate) async fn ensure_no_subscription(
    cx: &PassContext<'_>,
    topic: Option<&Topic>,
) -> Result<(), ReconcileError> {
    let Some(topic) = topic else {
        cx.events.warn(
            reason::UNSUBSCRIBED,
            "Topic not found, skipping finalization of subscription".to_string(),
        );
        return Ok(());
    };

    let topic_id = topic_resource_id(topic)?;
    let (group, topic_name) = topic_id.group_and_name()?;
    let name = subscription_name(cx);

    let op = match cx
        .remote
        .run(cx.clients.subscriptions.delete(group, topic_name, &name))
        .await
    {
        Ok(op) => op,
        Err(e) => {
            return cx.tolerate(
                reason::UNSUBSCRIBED,
                reason::FAILED_UNSUBSCRIBE,
                format_args!("deleting subscription {name:?} from topic {topic_id}"),
                e,
            );
        }
    };
    if let Err(e) = cx.remote.wait(op).await {
        return cx.tolerate(
            reason::UNSUBSCRIBED,
            reason::FAILED_UNSUBSCRIBE,
            format_args!("waiting for deletion of subscription {name:?}"),
            e,
        );
    }

    tracing::info!(subscription = %name, topic_id = %topic_id, "deleted subscription");
    cx.events.normal(
        reason::UNSUBSCRIBED,
        format!("Deleted subscription {name:?} from topic {topic_id}"),
    );
    Ok(())
}
