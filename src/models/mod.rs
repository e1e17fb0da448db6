//! Model Layer
//!
//! Data types shared by the inference engine.
//!
//! Structure:
//! - `kind.rs` - Resource kinds with dedicated handling
//! - `resource_id.rs` - Stable `cluster/namespace/group/kind/name` keys
//! - `resource_record.rs` - Normalized resource records
//! - `ownership.rs` - Ownership classification
//! - `relation.rs` - Typed relationship edges
//! - `gitops.rs` - Git sources and deployers

pub mod gitops;
pub mod kind;
pub mod ownership;
pub mod relation;
pub mod resource_id;
pub mod resource_record;

pub use gitops::{Deployer, GitOpsTool, GitSource, SourceRef, extract_deployers, extract_git_sources};
pub use kind::ResourceKind;
pub use ownership::{OwnerType, Ownership};
pub use relation::{RelationEdge, RelationType};
pub use resource_id::{ResourceId, api_group};
pub use resource_record::{
    Container, EnvFromSource, EnvVar, OwnerRef, RecordError, ResourceRecord, Volume,
};
