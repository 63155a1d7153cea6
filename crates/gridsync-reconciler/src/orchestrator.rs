//! Sequencing of the topic, hub and subscription reconcilers.

use std::sync::Arc;

use gridsync_client::{ClientFactory, Clients, default_classifier};
use gridsync_core::{ErrorClassifier, ErrorKind};
use tokio_util::sync::CancellationToken;

use crate::config::ReconcilerConfig;
use crate::error::ReconcileError;
use crate::events::{EventRecorder, TracingRecorder, reason};
use crate::reconcile::{
    PassContext, ensure_hub, ensure_no_hub, ensure_no_subscription, ensure_no_topic,
    ensure_subscription, ensure_topic, find_topic,
};
use crate::remote::RemoteCall;
use crate::source::EventGridSource;
use crate::status::{ReconciliationStatus, StatusReason};

/// Result of [`Reconciler::apply`]. The status is meant to be persisted whether
/// or not the pass succeeded.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub status: ReconciliationStatus,
    pub result: Result<(), ReconcileError>,
}

/// Reconciles event sources against the remote management API.
///
/// Holds no per-source state: distinct sources may be reconciled concurrently,
/// while passes for the same source are expected to be serialized by the caller.
pub struct Reconciler<F> {
    factory: F,
    config: ReconcilerConfig,
    classifier: ErrorClassifier,
    events: Arc<dyn EventRecorder>,
}

impl<F: ClientFactory> Reconciler<F> {
    pub fn new(factory: F, config: ReconcilerConfig) -> Self {
        Self {
            factory,
            config,
            classifier: default_classifier(),
            events: Arc::new(TracingRecorder),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventRecorder>) -> Self {
        self.events = events;
        self
    }

    /// Replaces the error classifier, e.g. to understand additional error types
    /// of a custom client implementation.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Ensures topic, hub and subscription exist for `source`, in that order.
    ///
    /// Any failure stops the pass. The returned status carries the reason of the
    /// failing step; on success it is marked subscribed and records all three IDs.
    #[tracing::instrument(skip_all, fields(namespace = %source.namespace, name = %source.name))]
    pub async fn apply(
        &self,
        source: &EventGridSource,
        prior: ReconciliationStatus,
        cancel: CancellationToken,
    ) -> ReconcileOutcome {
        let mut status = prior;
        let result = self.apply_steps(source, &mut status, cancel).await;

        match &result {
            Ok(()) => tracing::info!("source subscribed"),
            Err(e) => self.report(e),
        }

        ReconcileOutcome { status, result }
    }

    async fn apply_steps(
        &self,
        source: &EventGridSource,
        status: &mut ReconciliationStatus,
        cancel: CancellationToken,
    ) -> Result<(), ReconcileError> {
        let remote = RemoteCall::new(self.config.request_timeout(), cancel);

        let clients = match remote.run(self.clients(source)).await {
            Ok(clients) => clients,
            Err(e) => {
                let detail = self.classifier.describe(&e);
                return Err(match self.classifier.classify(&e) {
                    ErrorKind::NoCredentials => {
                        let message = format!("Credentials missing: {detail}");
                        status.mark_not_subscribed(StatusReason::NoClient, &message);
                        ReconcileError::permanent(reason::FAILED_SUBSCRIBE, message)
                    }
                    kind => {
                        let message = format!("Error obtaining clients: {detail}");
                        status.mark_not_subscribed(StatusReason::NoClient, &message);
                        if kind.is_terminal() {
                            ReconcileError::permanent(reason::FAILED_SUBSCRIBE, message)
                        } else {
                            ReconcileError::transient(reason::FAILED_SUBSCRIBE, message, e)
                        }
                    }
                });
            }
        };

        let cx = self.context(source, &clients, remote);

        let topic_id = ensure_topic(&cx)
            .await
            .inspect_err(|e| status.mark_not_subscribed(StatusReason::TopicFailed, e.to_string()))?;
        status.topic_id = Some(topic_id.clone());

        let hub_id = ensure_hub(&cx)
            .await
            .inspect_err(|e| status.mark_not_subscribed(StatusReason::HubFailed, e.to_string()))?;
        status.hub_id = Some(hub_id.clone());

        let subscription_id = ensure_subscription(&cx, &topic_id, &hub_id)
            .await
            .inspect_err(|e| {
                status.mark_not_subscribed(StatusReason::SubscriptionFailed, e.to_string())
            })?;
        status.subscription_id = Some(subscription_id);

        status.mark_subscribed();
        Ok(())
    }

    /// Tears down what [`apply`](Self::apply) created: subscription, hub, then topic.
    ///
    /// Missing resources, denied access and missing credentials are reported and
    /// skipped so that deletion of the source is never blocked on them. Only
    /// unclassified remote failures (retriable) and malformed identifiers fail.
    #[tracing::instrument(skip_all, fields(namespace = %source.namespace, name = %source.name))]
    pub async fn finalize(
        &self,
        source: &EventGridSource,
        cancel: CancellationToken,
    ) -> Result<(), ReconcileError> {
        let result = self.finalize_steps(source, cancel).await;
        match &result {
            Ok(()) => tracing::info!("source finalized"),
            Err(e) => self.report(e),
        }
        result
    }

    async fn finalize_steps(
        &self,
        source: &EventGridSource,
        cancel: CancellationToken,
    ) -> Result<(), ReconcileError> {
        let remote = RemoteCall::new(self.config.request_timeout(), cancel);

        let clients = match remote.run(self.clients(source)).await {
            Ok(clients) => clients,
            Err(e)
                if matches!(
                    self.classifier.classify(&e),
                    ErrorKind::AccessDenied | ErrorKind::NoCredentials
                ) =>
            {
                self.events.warn(
                    reason::FAILED_UNSUBSCRIBE,
                    format!(
                        "Unable to obtain clients while finalizing source. Ignoring: {}",
                        self.classifier.describe(&e)
                    ),
                );
                return Ok(());
            }
            Err(e) => {
                let message = format!("Error obtaining clients: {}", self.classifier.describe(&e));
                return Err(ReconcileError::transient(reason::FAILED_UNSUBSCRIBE, message, e));
            }
        };

        let cx = self.context(source, &clients, remote);

        let topic = match find_topic(&cx).await {
            Ok(topic) => topic,
            Err(e) => match cx.kind(&e) {
                ErrorKind::NotFound => None,
                ErrorKind::AccessDenied | ErrorKind::NoCredentials => {
                    cx.events.warn(
                        reason::FAILED_UNSUBSCRIBE,
                        format!("Access denied to topic API. Ignoring: {}", cx.describe(&e)),
                    );
                    None
                }
                ErrorKind::Unclassified => {
                    let message = format!("Error looking up topic: {}", cx.describe(&e));
                    return Err(ReconcileError::transient(reason::FAILED_TOPIC, message, e));
                }
            },
        };

        ensure_no_subscription(&cx, topic.as_ref()).await?;
        ensure_no_hub(&cx).await?;
        ensure_no_topic(&cx, topic).await
    }

    async fn clients(&self, source: &EventGridSource) -> Result<Clients, gridsync_client::ApiError> {
        self.factory
            .clients(&source.namespace, &source.name, &source.spec.scope)
            .await
    }

    fn context<'a>(
        &'a self,
        source: &'a EventGridSource,
        clients: &'a Clients,
        remote: RemoteCall,
    ) -> PassContext<'a> {
        PassContext {
            source,
            clients,
            config: &self.config,
            events: self.events.as_ref(),
            classifier: &self.classifier,
            remote,
        }
    }

    fn report(&self, err: &ReconcileError) {
        tracing::warn!(error = %err, retriable = err.is_retriable(), "reconcile pass failed");
        if let Some(reason) = err.reason() {
            self.events.warn(reason, err.to_string());
        }
    }
}
