//! Notifications about what a reconcile pass did.
//!
//! The external controller decides where notifications end up. [`TracingRecorder`]
//! turns them into log lines, [`MemoryRecorder`] keeps them for inspection.

use parking_lot::Mutex;

/// Stable reason codes attached to notifications.
pub mod reason {
    pub const TOPIC_SYNCED: &str = "TopicSynced";
    pub const TOPIC_FINALIZED: &str = "TopicFinalized";
    pub const FAILED_TOPIC: &str = "FailedTopic";
    pub const HUB_CREATED: &str = "HubCreated";
    pub const HUB_DELETED: &str = "HubDeleted";
    pub const FAILED_HUB: &str = "FailedHub";
    pub const SUBSCRIBED: &str = "Subscribed";
    pub const UNSUBSCRIBED: &str = "Unsubscribed";
    pub const FAILED_SUBSCRIBE: &str = "FailedSubscribe";
    pub const FAILED_UNSUBSCRIBE: &str = "FailedUnsubscribe";
    pub const RESOURCE_GROUP_CREATED: &str = "ResourceGroupCreated";
    pub const FAILED_RESOURCE_GROUP: &str = "FailedResourceGroup";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

/// Sink for notifications.
pub trait EventRecorder: Send + Sync {
    fn record(&self, event_type: EventType, reason: &'static str, message: String);

    fn normal(&self, reason: &'static str, message: String) {
        self.record(EventType::Normal, reason, message);
    }

    fn warn(&self, reason: &'static str, message: String) {
        self.record(EventType::Warning, reason, message);
    }
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl EventRecorder for TracingRecorder {
    fn record(&self, event_type: EventType, reason: &'static str, message: String) {
        match event_type {
            EventType::Normal => tracing::info!(reason, "{message}"),
            EventType::Warning => tracing::warn!(reason, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub event_type: EventType,
    pub reason: &'static str,
    pub message: String,
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Reasons of all recorded notifications, oldest first.
    pub fn reasons(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.reason).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventRecorder for MemoryRecorder {
    fn record(&self, event_type: EventType, reason: &'static str, message: String) {
        self.events.lock().push(RecordedEvent {
            event_type,
            reason,
            message,
        });
    }
}
