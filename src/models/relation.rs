//! Typed relationship edges between resources

use super::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of relationship between two resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// Owner reference (Deployment owns ReplicaSet)
    Owns,
    /// Label selector match (Service selects Pod)
    Selects,
    /// Volume source (Pod mounts ConfigMap/Secret)
    Mounts,
    /// Environment reference (Pod references ConfigMap/Secret)
    References,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Owns => "owns",
            RelationType::Selects => "selects",
            RelationType::Mounts => "mounts",
            RelationType::References => "references",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed edge in the relationship graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationEdge {
    pub from: ResourceId,
    pub to: ResourceId,
    #[serde(rename = "type")]
    pub relation: RelationType,
    /// The `from` side was synthesized from a reference rather than scanned
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

impl RelationEdge {
    pub fn new(from: ResourceId, to: ResourceId, relation: RelationType) -> Self {
        Self {
            from,
            to,
            relation,
            partial: false,
        }
    }

    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}
