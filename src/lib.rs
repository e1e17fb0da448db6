//! GitOps Scout Library
//!
//! Inventories Kubernetes resources, infers which GitOps tool or packager
//! manages each one, derives typed relationships between them and suggests
//! how the setup could be organized.
//!
//! The inference core (`ownership`, `graph`, `patterns`, `snapshot`) is pure
//! and synchronous. Collection from a live cluster lives in `kube`.

pub mod cli;
pub mod config;
pub mod graph;
pub mod kube;
pub mod models;
pub mod ownership;
pub mod patterns;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use graph::{RelationGraph, build_relations};
pub use models::{
    OwnerType, Ownership, RelationEdge, RelationType, ResourceId, ResourceKind, ResourceRecord,
};
pub use ownership::OwnershipResolver;
pub use patterns::{PatternReport, analyze};
pub use snapshot::{Snapshot, build_snapshot};
