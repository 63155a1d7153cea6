//! Shared in-memory state behind every capability trait.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use gridsync_client::{
    ApiError, CredentialsError, Hub, HubClient, Operation, Page, Ready, ResourceGroupClient,
    ScopeClient, Subscription, SubscriptionClient, SubscriptionProperties, Topic, TopicClient,
};
use gridsync_core::ResourceId;
use parking_lot::Mutex;

const TOPIC_PROVIDER: &str = "Microsoft.EventGrid";
const TOPIC_TYPE: &str = "systemTopics";
const SUBSCRIPTION_TYPE: &str = "eventSubscriptions";
const HUB_PROVIDER: &str = "Microsoft.EventHub";
const HUB_NAMESPACE_TYPE: &str = "namespaces";
const HUB_TYPE: &str = "eventhubs";

const DEFAULT_TOPIC_PAGE_SIZE: usize = 100;
const SUCCEEDED: &str = "Succeeded";

/// Remote operations, as counted by [`InMemoryGrid::calls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    TopicList,
    TopicGet,
    TopicWrite,
    TopicDelete,
    HubGet,
    HubWrite,
    HubDelete,
    SubscriptionGet,
    SubscriptionWrite,
    SubscriptionDelete,
    SubscriptionList,
    ScopeLocation,
    ResourceGroupExists,
    ResourceGroupCreate,
}

impl Call {
    /// Operations that mutate remote state.
    pub const WRITES: [Call; 7] = [
        Call::TopicWrite,
        Call::TopicDelete,
        Call::HubWrite,
        Call::HubDelete,
        Call::SubscriptionWrite,
        Call::SubscriptionDelete,
        Call::ResourceGroupCreate,
    ];

    /// Operations addressed to a topic or one of its subscriptions.
    pub const TOPIC_SCOPED: [Call; 6] = [
        Call::TopicGet,
        Call::TopicWrite,
        Call::TopicDelete,
        Call::SubscriptionGet,
        Call::SubscriptionWrite,
        Call::SubscriptionDelete,
    ];
}

/// Failure injected into every subsequent call of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with an error response carrying this status.
    Status(u16),
    /// Never answer.
    Hang,
}

/// Failure injected into client acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsFault {
    MissingSecret,
    Permanent,
    TokenRefresh,
    /// Credentials are valid but the principal lost its role assignment.
    Forbidden,
}

impl CredentialsFault {
    fn to_error(self) -> ApiError {
        match self {
            Self::MissingSecret => CredentialsError::SecretNotFound {
                namespace: "default".to_string(),
                name: "azure-credentials".to_string(),
            }
            .into(),
            Self::Permanent => {
                CredentialsError::Permanent("client ID is not a valid UUID".to_string()).into()
            }
            Self::TokenRefresh => CredentialsError::TokenRefresh(
                "AADSTS7000215: Invalid client secret provided. Trace ID: 5b1c2e".to_string(),
            )
            .into(),
            Self::Forbidden => ApiError::forbidden("role assignment revoked"),
        }
    }
}

type TopicKey = (String, String);
type HubKey = (String, String, String);
type SubscriptionKey = (String, String, String);

#[derive(Debug, Default)]
struct GridState {
    topics: BTreeMap<TopicKey, Topic>,
    hubs: BTreeMap<HubKey, Hub>,
    subscriptions: BTreeMap<SubscriptionKey, Subscription>,
    /// Lowercased name -> region.
    resource_groups: BTreeMap<String, String>,
    /// Lowercased rendered scope ID -> region.
    locations: HashMap<String, String>,
}

/// One root account worth of topics, hubs, subscriptions and resource groups.
///
/// Resource group names are case-insensitive, as on the remote API.
#[derive(Debug)]
pub struct InMemoryGrid {
    root: String,
    state: Mutex<GridState>,
    calls: Mutex<HashMap<Call, usize>>,
    faults: Mutex<HashMap<Call, Fault>>,
    credentials: Mutex<Option<CredentialsFault>>,
    topic_page_size: usize,
    default_event_types: Vec<String>,
}

impl InMemoryGrid {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(GridState::default()),
            calls: Mutex::new(HashMap::new()),
            faults: Mutex::new(HashMap::new()),
            credentials: Mutex::new(None),
            topic_page_size: DEFAULT_TOPIC_PAGE_SIZE,
            default_event_types: vec![
                "Microsoft.Storage.BlobCreated".to_string(),
                "Microsoft.Storage.BlobDeleted".to_string(),
            ],
        }
    }

    /// Sets the number of topics returned per listing page.
    #[must_use]
    pub fn with_topic_page_size(mut self, size: usize) -> Self {
        self.topic_page_size = size.max(1);
        self
    }

    /// Sets the event types a subscription without an event type filter expands to.
    #[must_use]
    pub fn with_default_event_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_event_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn root_id(&self) -> &str {
        &self.root
    }

    // Seeding

    pub fn add_resource_group(&self, name: &str, region: &str) {
        self.state
            .lock()
            .resource_groups
            .insert(name.to_lowercase(), region.to_string());
    }

    /// Declares the region of a scope resource.
    pub fn set_location(&self, scope: &ResourceId, region: &str) {
        self.state
            .lock()
            .locations
            .insert(scope.to_string().to_lowercase(), region.to_string());
    }

    /// Stores a topic as is, bypassing validation. Returns the stored topic.
    pub fn insert_topic(&self, resource_group: &str, name: &str, topic: Topic) -> Topic {
        let mut state = self.state.lock();
        self.store_topic(&mut state, resource_group, name, topic)
    }

    /// Stores a subscription under an existing topic, bypassing validation.
    pub fn insert_subscription(
        &self,
        resource_group: &str,
        topic: &str,
        name: &str,
        properties: SubscriptionProperties,
    ) -> Subscription {
        let mut state = self.state.lock();
        self.store_subscription(&mut state, resource_group, topic, name, properties)
    }

    pub fn insert_hub(&self, resource_group: &str, namespace: &str, name: &str, hub: Hub) -> Hub {
        let mut state = self.state.lock();
        self.store_hub(&mut state, resource_group, namespace, name, hub)
    }

    // Inspection

    pub fn topic(&self, resource_group: &str, name: &str) -> Option<Topic> {
        self.state
            .lock()
            .topics
            .get(&topic_key(resource_group, name))
            .cloned()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.state.lock().topics.values().cloned().collect()
    }

    pub fn subscription(&self, resource_group: &str, topic: &str, name: &str) -> Option<Subscription> {
        self.state
            .lock()
            .subscriptions
            .get(&subscription_key(resource_group, topic, name))
            .cloned()
    }

    pub fn subscription_count(&self, resource_group: &str, topic: &str) -> usize {
        let state = self.state.lock();
        subscriptions_of(&state, resource_group, topic).count()
    }

    pub fn hub(&self, resource_group: &str, namespace: &str, name: &str) -> Option<Hub> {
        self.state
            .lock()
            .hubs
            .get(&hub_key(resource_group, namespace, name))
            .cloned()
    }

    pub fn has_resource_group(&self, name: &str) -> bool {
        self.state
            .lock()
            .resource_groups
            .contains_key(&name.to_lowercase())
    }

    // Accounting and faults

    pub fn calls(&self, call: Call) -> usize {
        self.calls.lock().get(&call).copied().unwrap_or(0)
    }

    /// Total number of calls that mutate remote state.
    pub fn writes(&self) -> usize {
        Call::WRITES.iter().map(|c| self.calls(*c)).sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn fail(&self, call: Call, fault: Fault) {
        self.faults.lock().insert(call, fault);
    }

    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Makes client acquisition fail, or succeed again with `None`.
    pub fn fail_credentials(&self, fault: Option<CredentialsFault>) {
        *self.credentials.lock() = fault;
    }

    pub(crate) fn credentials_error(&self) -> Option<ApiError> {
        self.credentials.lock().map(CredentialsFault::to_error)
    }

    async fn enter(&self, call: Call) -> Result<(), ApiError> {
        let fault = {
            *self.calls.lock().entry(call).or_default() += 1;
            self.faults.lock().get(&call).copied()
        };
        tracing::trace!(?call, ?fault, "in-memory grid call");

        match fault {
            None => Ok(()),
            Some(Fault::Status(status)) => Err(ApiError::status(
                status,
                format!("injected failure of {call:?}"),
            )),
            Some(Fault::Hang) => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    // Identifiers and storage

    fn topic_id(&self, resource_group: &str, name: &str) -> ResourceId {
        ResourceId::resource(&self.root, resource_group, TOPIC_PROVIDER, TOPIC_TYPE, name)
    }

    fn hub_id(&self, resource_group: &str, namespace: &str, name: &str) -> Result<ResourceId, ApiError> {
        ResourceId::resource(&self.root, resource_group, HUB_PROVIDER, HUB_NAMESPACE_TYPE, namespace)
            .child(HUB_TYPE, name)
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    fn store_topic(&self, state: &mut GridState, resource_group: &str, name: &str, mut topic: Topic) -> Topic {
        topic.id = Some(self.topic_id(resource_group, name).to_string());
        topic.name = Some(name.to_string());
        topic.provisioning_state = Some(SUCCEEDED.to_string());
        state
            .topics
            .insert(topic_key(resource_group, name), topic.clone());
        topic
    }

    fn store_subscription(
        &self,
        state: &mut GridState,
        resource_group: &str,
        topic: &str,
        name: &str,
        mut properties: SubscriptionProperties,
    ) -> Subscription {
        let topic_id = self.topic_id(resource_group, topic);
        // A resource-level ID always accepts a child.
        let id = topic_id
            .child(SUBSCRIPTION_TYPE, name)
            .map(|id| id.to_string())
            .unwrap_or_default();

        properties.topic = Some(topic_id.to_string());
        properties.provisioning_state = Some(SUCCEEDED.to_string());
        if let Some(filter) = properties.filter.as_mut() {
            if filter.included_event_types.as_ref().is_none_or(Vec::is_empty) {
                filter.included_event_types = Some(self.default_event_types.clone());
            }
        }

        let subscription = Subscription {
            id: Some(id),
            name: Some(name.to_string()),
            properties,
        };
        state.subscriptions.insert(
            subscription_key(resource_group, topic, name),
            subscription.clone(),
        );
        subscription
    }

    fn store_hub(&self, state: &mut GridState, resource_group: &str, namespace: &str, name: &str, mut hub: Hub) -> Hub {
        hub.id = self.hub_id(resource_group, namespace, name).ok().map(|id| id.to_string());
        hub.name = Some(name.to_string());
        state
            .hubs
            .insert(hub_key(resource_group, namespace, name), hub.clone());
        hub
    }

    fn write_topic(&self, resource_group: &str, name: &str, topic: Topic) -> Result<Topic, ApiError> {
        let mut state = self.state.lock();
        let key = topic_key(resource_group, name);

        if !state.resource_groups.contains_key(&key.0) {
            return Err(ApiError::not_found(format!(
                "Resource group '{resource_group}' could not be found."
            )));
        }
        if topic.source.is_empty() {
            return Err(ApiError::status(400, "Source of the system topic is required."));
        }
        if let Some(existing) = state.topics.get(&key) {
            if !existing.source.eq_ignore_ascii_case(&topic.source) {
                return Err(ApiError::status(400, "Source of a system topic cannot be changed."));
            }
        }
        let duplicate = state
            .topics
            .iter()
            .any(|(k, t)| *k != key && t.source.eq_ignore_ascii_case(&topic.source));
        if duplicate {
            return Err(ApiError::status(
                400,
                format!("Only one system topic is allowed per source. Source: {}", topic.source),
            ));
        }
        if !topic.location.eq_ignore_ascii_case("global") {
            if let Some(actual) = state.locations.get(&topic.source.to_lowercase()) {
                if !actual.eq_ignore_ascii_case(&topic.location) {
                    return Err(ApiError::status(
                        400,
                        format!(
                            "Location '{}' of the system topic does not match location '{actual}' of the source.",
                            topic.location
                        ),
                    ));
                }
            }
        }

        Ok(self.store_topic(&mut state, resource_group, name, topic))
    }

    fn write_subscription(
        &self,
        resource_group: &str,
        topic: &str,
        name: &str,
        subscription: Subscription,
    ) -> Result<Subscription, ApiError> {
        let mut state = self.state.lock();
        if !state.topics.contains_key(&topic_key(resource_group, topic)) {
            return Err(topic_not_found(resource_group, topic));
        }
        Ok(self.store_subscription(&mut state, resource_group, topic, name, subscription.properties))
    }
}

#[async_trait]
impl TopicClient for InMemoryGrid {
    async fn list_page(&self, continuation: Option<String>) -> Result<Page<Topic>, ApiError> {
        self.enter(Call::TopicList).await?;

        let start = match continuation {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ApiError::status(400, format!("invalid continuation token {token:?}")))?,
        };

        let state = self.state.lock();
        let items: Vec<Topic> = state
            .topics
            .values()
            .skip(start)
            .take(self.topic_page_size)
            .cloned()
            .collect();
        let end = start + items.len();
        let next = (end < state.topics.len()).then(|| end.to_string());

        Ok(Page { items, next })
    }

    async fn get(&self, resource_group: &str, name: &str) -> Result<Topic, ApiError> {
        self.enter(Call::TopicGet).await?;
        self.topic(resource_group, name)
            .ok_or_else(|| topic_not_found(resource_group, name))
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        topic: Topic,
    ) -> Result<Box<dyn Operation<Topic>>, ApiError> {
        self.enter(Call::TopicWrite).await?;
        let stored = self.write_topic(resource_group, name, topic)?;
        Ok(Box::new(Ready::ok(stored)))
    }

    async fn delete(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Box<dyn Operation<()>>, ApiError> {
        self.enter(Call::TopicDelete).await?;

        let mut state = self.state.lock();
        let key = topic_key(resource_group, name);
        if state.topics.remove(&key).is_none() {
            return Err(topic_not_found(resource_group, name));
        }
        state
            .subscriptions
            .retain(|(group, topic, _), _| !(*group == key.0 && *topic == key.1));

        Ok(Box::new(Ready::ok(())))
    }
}

#[async_trait]
impl HubClient for InMemoryGrid {
    async fn get(&self, resource_group: &str, namespace: &str, name: &str) -> Result<Hub, ApiError> {
        self.enter(Call::HubGet).await?;
        self.hub(resource_group, namespace, name)
            .ok_or_else(|| hub_not_found(namespace, name))
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        namespace: &str,
        name: &str,
        hub: Hub,
    ) -> Result<Hub, ApiError> {
        self.enter(Call::HubWrite).await?;
        if hub.partition_count == 0 {
            return Err(ApiError::status(400, "Partition count must be at least 1."));
        }
        let mut state = self.state.lock();
        Ok(self.store_hub(&mut state, resource_group, namespace, name, hub))
    }

    async fn delete(&self, resource_group: &str, namespace: &str, name: &str) -> Result<(), ApiError> {
        self.enter(Call::HubDelete).await?;
        self.state
            .lock()
            .hubs
            .remove(&hub_key(resource_group, namespace, name))
            .map(|_| ())
            .ok_or_else(|| hub_not_found(namespace, name))
    }
}

#[async_trait]
impl SubscriptionClient for InMemoryGrid {
    async fn get(&self, resource_group: &str, topic: &str, name: &str) -> Result<Subscription, ApiError> {
        self.enter(Call::SubscriptionGet).await?;
        self.subscription(resource_group, topic, name)
            .ok_or_else(|| subscription_not_found(name))
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        topic: &str,
        name: &str,
        subscription: Subscription,
    ) -> Result<Box<dyn Operation<Subscription>>, ApiError> {
        self.enter(Call::SubscriptionWrite).await?;
        let stored = self.write_subscription(resource_group, topic, name, subscription)?;
        Ok(Box::new(Ready::ok(stored)))
    }

    async fn delete(
        &self,
        resource_group: &str,
        topic: &str,
        name: &str,
    ) -> Result<Box<dyn Operation<()>>, ApiError> {
        self.enter(Call::SubscriptionDelete).await?;

        let mut state = self.state.lock();
        if !state.topics.contains_key(&topic_key(resource_group, topic)) {
            return Err(topic_not_found(resource_group, topic));
        }
        if state
            .subscriptions
            .remove(&subscription_key(resource_group, topic, name))
            .is_none()
        {
            return Err(subscription_not_found(name));
        }

        Ok(Box::new(Ready::ok(())))
    }

    async fn list_by_topic(
        &self,
        resource_group: &str,
        topic: &str,
        page_size: u32,
    ) -> Result<Page<Subscription>, ApiError> {
        self.enter(Call::SubscriptionList).await?;

        let state = self.state.lock();
        if !state.topics.contains_key(&topic_key(resource_group, topic)) {
            return Err(topic_not_found(resource_group, topic));
        }

        let total = subscriptions_of(&state, resource_group, topic).count();
        let items: Vec<Subscription> = subscriptions_of(&state, resource_group, topic)
            .take(page_size as usize)
            .cloned()
            .collect();
        let next = (items.len() < total).then(|| items.len().to_string());

        Ok(Page { items, next })
    }
}

#[async_trait]
impl ScopeClient for InMemoryGrid {
    async fn location(&self, resource: &ResourceId) -> Result<String, ApiError> {
        self.enter(Call::ScopeLocation).await?;
        self.state
            .lock()
            .locations
            .get(&resource.to_string().to_lowercase())
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Resource '{resource}' was not found.")))
    }
}

#[async_trait]
impl ResourceGroupClient for InMemoryGrid {
    async fn exists(&self, name: &str) -> Result<bool, ApiError> {
        self.enter(Call::ResourceGroupExists).await?;
        Ok(self.has_resource_group(name))
    }

    async fn create(&self, name: &str, region: &str) -> Result<(), ApiError> {
        self.enter(Call::ResourceGroupCreate).await?;
        self.add_resource_group(name, region);
        Ok(())
    }
}

fn topic_key(resource_group: &str, name: &str) -> TopicKey {
    (resource_group.to_lowercase(), name.to_string())
}

fn hub_key(resource_group: &str, namespace: &str, name: &str) -> HubKey {
    (resource_group.to_lowercase(), namespace.to_string(), name.to_string())
}

fn subscription_key(resource_group: &str, topic: &str, name: &str) -> SubscriptionKey {
    (resource_group.to_lowercase(), topic.to_string(), name.to_string())
}

fn subscriptions_of<'a>(
    state: &'a GridState,
    resource_group: &str,
    topic: &str,
) -> impl Iterator<Item = &'a Subscription> + 'a {
    let group = resource_group.to_lowercase();
    let topic = topic.to_string();
    state
        .subscriptions
        .iter()
        .filter(move |((g, t, _), _)| *g == group && *t == topic)
        .map(|(_, s)| s)
}

fn topic_not_found(resource_group: &str, name: &str) -> ApiError {
    ApiError::not_found(format!(
        "The Resource '{TOPIC_PROVIDER}/{TOPIC_TYPE}/{name}' under resource group '{resource_group}' was not found."
    ))
}

fn hub_not_found(namespace: &str, name: &str) -> ApiError {
    ApiError::not_found(format!(
        "The messaging entity '{namespace}:eventhub:{name}' could not be found."
    ))
}

fn subscription_not_found(name: &str) -> ApiError {
    ApiError::not_found(format!("Event subscription '{name}' was not found."))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gridsync_client::{Destination, SubscriptionFilter};

    use super::*;

    fn storage_scope() -> ResourceId {
        ResourceId::resource("0000", "data", "Microsoft.Storage", "storageAccounts", "blobs")
    }

    fn topic_for(scope: &ResourceId, location: &str) -> Topic {
        Topic {
            location: location.to_string(),
            source: scope.to_string(),
            topic_type: "Microsoft.Storage.StorageAccounts".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn topic_write_assigns_server_fields() {
        let grid = InMemoryGrid::new("0000");
        grid.add_resource_group("Data", "westeurope");

        let op = TopicClient::create_or_update(&grid, "data", "t1", topic_for(&storage_scope(), "westeurope"))
            .await
            .unwrap();
        let topic = op.wait().await.unwrap();

        assert_eq!(
            topic.id.as_deref(),
            Some("/subscriptions/0000/resourceGroups/data/providers/Microsoft.EventGrid/systemTopics/t1")
        );
        assert_eq!(topic.provisioning_state.as_deref(), Some("Succeeded"));
        assert_eq!(grid.calls(Call::TopicWrite), 1);
    }

    #[tokio::test]
    async fn rejects_second_topic_for_same_source() {
        let grid = InMemoryGrid::new("0000");
        grid.add_resource_group("data", "westeurope");
        grid.insert_topic("data", "t1", topic_for(&storage_scope(), "westeurope"));

        let mut other = topic_for(&storage_scope(), "westeurope");
        other.source = other.source.to_uppercase();
        let err = TopicClient::create_or_update(&grid, "data", "t2", other)
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn rejects_location_mismatch() {
        let grid = InMemoryGrid::new("0000");
        grid.add_resource_group("data", "westeurope");
        grid.set_location(&storage_scope(), "westeurope");

        let err = TopicClient::create_or_update(&grid, "data", "t1", topic_for(&storage_scope(), "eastus"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn lists_topics_in_pages() {
        let grid = InMemoryGrid::new("0000").with_topic_page_size(2);
        grid.add_resource_group("data", "westeurope");
        for i in 0..5 {
            let scope = ResourceId::resource("0000", "data", "Microsoft.Storage", "storageAccounts", format!("s{i}"));
            grid.insert_topic("data", &format!("t{i}"), topic_for(&scope, "westeurope"));
        }

        let mut seen = 0;
        let mut token = None;
        loop {
            let page = grid.list_page(token).await.unwrap();
            seen += page.items.len();
            match page.next {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        assert_eq!(seen, 5);
        assert_eq!(grid.calls(Call::TopicList), 3);
    }

    #[tokio::test]
    async fn unset_event_types_expand_to_defaults() {
        let grid = InMemoryGrid::new("0000").with_default_event_types(["A", "B"]);
        grid.add_resource_group("data", "westeurope");
        grid.insert_topic("data", "t1", topic_for(&storage_scope(), "westeurope"));

        let desired = Subscription {
            properties: SubscriptionProperties {
                destination: Some(Destination {
                    hub_id: "hub".to_string(),
                }),
                filter: Some(SubscriptionFilter::default()),
                ..Default::default()
            },
            ..Default::default()
        };
        let op = SubscriptionClient::create_or_update(&grid, "data", "t1", "s1", desired)
            .await
            .unwrap();
        let stored = op.wait().await.unwrap();

        let types = stored.properties.filter.unwrap().included_event_types.unwrap();
        assert_eq!(types, vec!["A".to_string(), "B".to_string()]);
        assert!(stored.properties.topic.unwrap().ends_with("/systemTopics/t1"));
    }

    #[tokio::test]
    async fn deleting_topic_removes_its_subscriptions() {
        let grid = InMemoryGrid::new("0000");
        grid.add_resource_group("data", "westeurope");
        grid.insert_topic("data", "t1", topic_for(&storage_scope(), "westeurope"));
        grid.insert_subscription("data", "t1", "s1", SubscriptionProperties::default());

        let op = TopicClient::delete(&grid, "data", "t1").await.unwrap();
        op.wait().await.unwrap();

        assert_eq!(grid.subscription_count("data", "t1"), 0);
        let err = grid.list_by_topic("data", "t1", 1).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn injected_faults_apply_per_operation() {
        let grid = InMemoryGrid::new("0000");
        grid.fail(Call::ResourceGroupExists, Fault::Status(403));
        assert_eq!(grid.exists("x").await.unwrap_err().status_code(), Some(403));

        grid.fail(Call::ResourceGroupCreate, Fault::Hang);
        let res = tokio::time::timeout(Duration::from_millis(20), grid.create("x", "westus2")).await;
        assert!(res.is_err());
        assert_eq!(grid.calls(Call::ResourceGroupCreate), 1);

        grid.clear_faults();
        assert!(!grid.exists("x").await.unwrap());
    }
}
