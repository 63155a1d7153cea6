//! Capability traits of the remote management API.
//!
//! One trait per resource kind, each limited to the operations the reconcilers
//! need. Implementations must be cheap to share across tasks.

use std::sync::Arc;

use async_trait::async_trait;
use gridsync_core::ResourceId;

use crate::model::{Hub, Page, Subscription, Topic};
use crate::operation::Operation;
use crate::ApiError;

/// Routing topics of one root account.
#[async_trait]
pub trait TopicClient: Send + Sync {
    /// Lists every topic in the root account, one page at a time.
    ///
    /// `continuation` is the `next` token of the previous page, or `None` for
    /// the first page.
    async fn list_page(&self, continuation: Option<String>) -> Result<Page<Topic>, ApiError>;

    async fn get(&self, resource_group: &str, name: &str) -> Result<Topic, ApiError>;

    /// Creates the topic, or replaces it if it exists.
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        topic: Topic,
    ) -> Result<Box<dyn Operation<Topic>>, ApiError>;

    async fn delete(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Box<dyn Operation<()>>, ApiError>;
}

/// Delivery hubs inside a hub namespace.
#[async_trait]
pub trait HubClient: Send + Sync {
    async fn get(&self, resource_group: &str, namespace: &str, name: &str)
    -> Result<Hub, ApiError>;

    /// Creates the hub, or replaces it if it exists. Completes synchronously.
    async fn create_or_update(
        &self,
        resource_group: &str,
        namespace: &str,
        name: &str,
        hub: Hub,
    ) -> Result<Hub, ApiError>;

    async fn delete(&self, resource_group: &str, namespace: &str, name: &str)
    -> Result<(), ApiError>;
}

/// Subscriptions attached to a topic.
#[async_trait]
pub trait SubscriptionClient: Send + Sync {
    async fn get(
        &self,
        resource_group: &str,
        topic: &str,
        name: &str,
    ) -> Result<Subscription, ApiError>;

    async fn create_or_update(
        &self,
        resource_group: &str,
        topic: &str,
        name: &str,
        subscription: Subscription,
    ) -> Result<Box<dyn Operation<Subscription>>, ApiError>;

    async fn delete(
        &self,
        resource_group: &str,
        topic: &str,
        name: &str,
    ) -> Result<Box<dyn Operation<()>>, ApiError>;

    /// Returns the first page of the topic's subscriptions, holding at most
    /// `page_size` items.
    async fn list_by_topic(
        &self,
        resource_group: &str,
        topic: &str,
        page_size: u32,
    ) -> Result<Page<Subscription>, ApiError>;
}

/// Read access to arbitrary resources used as a scope.
#[async_trait]
pub trait ScopeClient: Send + Sync {
    /// Returns the region the resource lives in.
    async fn location(&self, resource: &ResourceId) -> Result<String, ApiError>;
}

/// Resource groups of the root account.
#[async_trait]
pub trait ResourceGroupClient: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, ApiError>;

    async fn create(&self, name: &str, region: &str) -> Result<(), ApiError>;
}

/// Bundle of clients bound to the credentials of one desired-state object.
#[derive(Clone)]
pub struct Clients {
    pub topics: Arc<dyn TopicClient>,
    pub hubs: Arc<dyn HubClient>,
    pub subscriptions: Arc<dyn SubscriptionClient>,
    pub scopes: Arc<dyn ScopeClient>,
    pub resource_groups: Arc<dyn ResourceGroupClient>,
}

impl std::fmt::Debug for Clients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clients").finish_non_exhaustive()
    }
}

/// Produces [`Clients`] for a desired-state object.
///
/// Credentials are resolved per object, so a missing secret surfaces as
/// [`ApiError::Credentials`] for that object only.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn clients(
        &self,
        namespace: &str,
        name: &str,
        scope: &ResourceId,
    ) -> Result<Clients, ApiError>;
}
