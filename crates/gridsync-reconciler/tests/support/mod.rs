#![allow(dead_code)]

use std::sync::Arc;

use gridsync_client_memory::{InMemoryGrid, MemoryClientFactory};
use gridsync_core::{ResourceId, checksum_name, deterministic_name};
use gridsync_reconciler::{
    EventGridSource, EventGridSourceSpec, HubEndpoint, MemoryRecorder, ReconcileError,
    ReconcileOutcome, Reconciler, ReconcilerConfig, ReconciliationStatus,
};
use tokio_util::sync::CancellationToken;

pub const ROOT: &str = "0000-1111";
pub const SCOPE_GROUP: &str = "data";
pub const HUB_GROUP: &str = "hubs";
pub const HUB_NAMESPACE: &str = "events";
pub const REGION: &str = "westeurope";

pub fn storage_scope() -> ResourceId {
    ResourceId::resource(ROOT, SCOPE_GROUP, "Microsoft.Storage", "storageAccounts", "blobs")
}

pub fn hub_namespace() -> ResourceId {
    ResourceId::resource(ROOT, HUB_GROUP, "Microsoft.EventHub", "namespaces", HUB_NAMESPACE)
}

pub fn source_for(scope: ResourceId, name: &str) -> EventGridSource {
    EventGridSource::new(
        "default",
        name,
        EventGridSourceSpec {
            scope,
            event_types: None,
            endpoint: HubEndpoint {
                namespace_id: hub_namespace(),
                hub_name: None,
            },
        },
    )
}

pub fn storage_source() -> EventGridSource {
    source_for(storage_scope(), "blobs")
}

pub fn topic_name(scope: &ResourceId) -> String {
    let cfg = ReconcilerConfig::default();
    checksum_name(&cfg.naming.topic_prefix, &scope.to_string().to_lowercase())
}

pub fn subscription_name(source: &EventGridSource) -> String {
    let cfg = ReconcilerConfig::default();
    deterministic_name(&source.namespace, &source.name, &cfg.naming.subscription_prefix)
}

pub fn hub_name(source: &EventGridSource) -> String {
    let cfg = ReconcilerConfig::default();
    deterministic_name(&source.namespace, &source.name, &cfg.naming.hub_prefix)
}

/// A grid holding the resource groups and scope used by most tests.
pub fn seeded_grid() -> InMemoryGrid {
    let grid = InMemoryGrid::new(ROOT);
    grid.add_resource_group(SCOPE_GROUP, REGION);
    grid.add_resource_group(HUB_GROUP, REGION);
    grid.set_location(&storage_scope(), REGION);
    grid
}

pub struct Harness {
    pub grid: Arc<InMemoryGrid>,
    pub events: Arc<MemoryRecorder>,
    pub reconciler: Reconciler<MemoryClientFactory>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_grid(seeded_grid())
    }

    pub fn with_grid(grid: InMemoryGrid) -> Self {
        Self::with_config(grid, ReconcilerConfig::default())
    }

    pub fn with_config(grid: InMemoryGrid, config: ReconcilerConfig) -> Self {
        let grid = Arc::new(grid);
        let events = Arc::new(MemoryRecorder::new());
        let reconciler = Reconciler::new(MemoryClientFactory::new(grid.clone()), config)
            .with_events(events.clone());
        Self {
            grid,
            events,
            reconciler,
        }
    }

    pub async fn apply(&self, source: &EventGridSource) -> ReconcileOutcome {
        self.reconciler
            .apply(source, ReconciliationStatus::default(), CancellationToken::new())
            .await
    }

    pub async fn finalize(&self, source: &EventGridSource) -> Result<(), ReconcileError> {
        self.reconciler
            .finalize(source, CancellationToken::new())
            .await
    }
}
