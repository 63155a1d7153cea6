//! Core building blocks shared by the gridsync crates.
//!
//! - [`ResourceId`]: structured identifiers for remote resources
//! - [`naming`]: checksum-derived, stable resource names
//! - [`classify`]: mapping of arbitrary error chains to a small set of kinds

pub mod classify;
pub mod naming;
pub mod resource_id;

pub use classify::{ErrorClassifier, ErrorKind, MessageSegment};
pub use naming::{checksum_name, deterministic_name};
pub use resource_id::{ResourceId, ResourceIdError};
