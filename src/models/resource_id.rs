//! Stable resource identifiers
//!
//! A `ResourceId` is the join key between snapshot entries and relations:
//! `cluster/namespace/group/kind/name`, with empty segments kept in place
//! (core-group and cluster-scoped resources produce `//` runs).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key identifying one live object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(cluster: &str, namespace: &str, group: &str, kind: &str, name: &str) -> Self {
        Self(format!("{}/{}/{}/{}/{}", cluster, namespace, group, kind, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// Extract the API group from an `apiVersion` string
///
/// `apps/v1` -> `apps`, `v1` -> `` (core group)
pub fn api_group(api_version: &str) -> &str {
    match api_version.split_once('/') {
        Some((group, _)) => group,
        None => "",
    }
}
