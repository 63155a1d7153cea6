//! Reconciliation of Event Grid style topologies.
//!
//! For each event source, a routing topic for the source's scope, a delivery hub
//! and a subscription binding the two are kept in sync with the remote management
//! API. See [`Reconciler::apply`] and [`Reconciler::finalize`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gridsync_reconciler::{Reconciler, ReconciliationStatus, config::loader};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = loader::load_config(None)?;
//! gridsync_reconciler::observability::init_tracing_with_level(&config.logging.level);
//!
//! let reconciler = Reconciler::new(factory, config);
//! let outcome = reconciler
//!     .apply(&source, ReconciliationStatus::default(), CancellationToken::new())
//!     .await;
//! persist(outcome.status);
//! outcome.result?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod observability;
pub mod orchestrator;
pub mod reconcile;
mod remote;
pub mod source;
pub mod status;

pub use config::{ConfigError, ReconcilerConfig};
pub use error::ReconcileError;
pub use events::{EventRecorder, EventType, MemoryRecorder, RecordedEvent, TracingRecorder};
pub use orchestrator::{ReconcileOutcome, Reconciler};
pub use source::{EventGridSource, EventGridSourceSpec, HubEndpoint};
pub use status::{ReconciliationStatus, StatusReason};
