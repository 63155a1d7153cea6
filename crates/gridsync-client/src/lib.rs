//! Remote management API boundary.
//!
//! The reconcilers consume the remote API exclusively through the capability traits
//! in [`traits`], one per resource kind, each exposing only the operations needed to
//! reconcile that kind. Transport, authentication and retries at the HTTP level are
//! the concern of the implementations.
//!
//! # Example
//!
//! ```ignore
//! use gridsync_client::{ClientFactory, Clients};
//!
//! async fn topic_count(factory: &dyn ClientFactory, scope: &ResourceId) -> Result<usize, ApiError> {
//!     let clients = factory.clients("default", "my-source", scope).await?;
//!     let page = clients.topics.list_page(None).await?;
//!     Ok(page.items.len())
//! }
//! ```

pub mod error;
pub mod model;
pub mod operation;
pub mod traits;

pub use error::{ApiError, CredentialsError, default_classifier};
pub use model::{
    DeliverySchema, Destination, Hub, Page, RetryPolicy, Subscription, SubscriptionFilter,
    SubscriptionProperties, Topic,
};
pub use operation::{Operation, Ready};
pub use traits::{
    ClientFactory, Clients, HubClient, ResourceGroupClient, ScopeClient, SubscriptionClient,
    TopicClient,
};
