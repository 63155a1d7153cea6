//! In-memory remote management API for gridsync.
//!
//! [`InMemoryGrid`] implements every capability trait of `gridsync-client` over a
//! single shared state, counts calls per operation and can inject failures. It
//! backs the reconciler tests and local dry runs.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gridsync_client_memory::{Call, InMemoryGrid, MemoryClientFactory};
//!
//! let grid = Arc::new(InMemoryGrid::new("0000-1111"));
//! grid.add_resource_group("my-group", "westeurope");
//! let factory = MemoryClientFactory::new(grid.clone());
//! // ... reconcile ...
//! assert_eq!(grid.calls(Call::TopicWrite), 1);
//! ```

pub mod factory;
pub mod grid;

pub use factory::MemoryClientFactory;
pub use grid::{Call, CredentialsFault, Fault, InMemoryGrid};
