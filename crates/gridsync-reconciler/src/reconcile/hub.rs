//! Delivery hub reconciliation.

use gridsync_client::Hub;
use gridsync_core::{ErrorKind, ResourceId, deterministic_name};

use super::PassContext;
use crate::error::ReconcileError;
use crate::events::reason;
use crate::source::HUB_SUB_RESOURCE_TYPE;

/// Name of the hub managed on behalf of the current source.
pub(crate) fn managed_hub_name(cx: &PassContext<'_>) -> String {
    deterministic_name(
        &cx.source.namespace,
        &cx.source.name,
        &cx.config.naming.hub_prefix,
    )
}

/// Ensures the delivery hub exists and returns its ID.
///
/// A user-supplied hub is returned as is. Otherwise a hub with a deterministic
/// name is created in the configured namespace, sized for the lowest service tier
/// since the actual tier of the namespace is unknown.
#[tracing::instrument(skip_all, fields(namespace_id = %cx.source.spec.endpoint.namespace_id))]
pub(crate) async fn ensure_hub(cx: &PassContext<'_>) -> Result<ResourceId, ReconcileError> {
    let endpoint = &cx.source.spec.endpoint;
    if let Some(user_hub) = endpoint.user_hub_id() {
        return Ok(user_hub?);
    }

    let scope = cx.source.spec.scope.to_string();
    let (group, namespace) = endpoint.namespace_id.group_and_name()?;
    let name = managed_hub_name(cx);

    let hub = match cx
        .remote
        .run(cx.clients.hubs.get(group, namespace, &name))
        .await
    {
        Ok(hub) => hub,
        Err(e) if cx.kind(&e) == ErrorKind::NotFound => {
            let desired = Hub {
                partition_count: cx.config.hub.partition_count,
                retention_days: cx.config.hub.retention_days,
                ..Default::default()
            };
            let hub = cx
                .remote
                .run(cx.clients.hubs.create_or_update(group, namespace, &name, desired))
                .await
                .map_err(|e| {
                    cx.failure(
                        reason::FAILED_HUB,
                        format_args!("creating hub for resource {scope:?}"),
                        e,
                    )
                })?;

            tracing::info!(hub = %name, "created hub");
            cx.events.normal(
                reason::HUB_CREATED,
                format!("Created hub {name:?} for resource {scope:?}"),
            );
            hub
        }
        Err(e) => {
            return Err(cx.failure(
                reason::FAILED_HUB,
                format_args!("getting hub for resource {scope:?}"),
                e,
            ));
        }
    };

    match hub.id.as_deref() {
        Some(id) => Ok(id.parse()?),
        None => Ok(endpoint.namespace_id.child(HUB_SUB_RESOURCE_TYPE, &name)?),
    }
}

/// Deletes the hub managed on behalf of the current source. User-supplied hubs
/// are left alone.
#[tracing::instrument(skip_all, fields(namespace_id = %cx.source.spec.endpoint.namespace_id))]
pub(crate) async fn ensure_no_hub(cx: &PassContext<'_>) -> Result<(), ReconcileError> {
    let endpoint = &cx.source.spec.endpoint;
    if endpoint.user_hub_id().is_some() {
        return Ok(());
    }

    let (group, namespace) = endpoint.namespace_id.group_and_name()?;
    let name = managed_hub_name(cx);

    if let Err(e) = cx
        .remote
        .run(cx.clients.hubs.delete(group, namespace, &name))
        .await
    {
        return cx.tolerate(
            reason::UNSUBSCRIBED,
            reason::FAILED_HUB,
            format_args!("deleting hub {name:?}"),
            e,
        );
    }

    tracing::info!(hub = %name, "deleted hub");
    cx.events.normal(
        reason::HUB_DELETED,
        format!(
            "Deleted hub {name:?} for resource {:?}",
            cx.source.spec.scope.to_string()
        ),
    );
    Ok(())
}
