//! GSF snapshot assembly
//!
//! A snapshot is the serializable result of one scan: every resource with its
//! inferred owner, the typed relations between them, and summary counts.
//! Resource IDs are the join key for downstream tooling.

use crate::graph::build_relations;
use crate::models::{Ownership, RelationEdge, ResourceId, ResourceRecord};
use crate::ownership::OwnershipResolver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written into every snapshot
pub const SNAPSHOT_VERSION: &str = "gsf/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub id: ResourceId,
    pub cluster: String,
    pub namespace: String,
    pub kind: String,
    pub name: String,
    pub api_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Ownership>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub total: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub by_owner: BTreeMap<String, usize>,
    pub drifted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub cluster: String,
    pub entries: Vec<SnapshotEntry>,
    pub relations: Vec<RelationEdge>,
    pub summary: SnapshotSummary,
}

impl Snapshot {
    pub fn entry(&self, id: &ResourceId) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }
}

/// Build a snapshot from normalized records
///
/// Entries keep input order. Every entry carries its resolved owner, Native
/// included, so `byOwner` accounts for every resource.
pub fn build_snapshot(
    cluster: &str,
    records: &[ResourceRecord],
    resolver: &OwnershipResolver,
    generated_at: DateTime<Utc>,
) -> Snapshot {
    let mut summary = SnapshotSummary::default();
    let mut entries = Vec::with_capacity(records.len());

    for record in records {
        let owner = resolver.resolve(record);
        summary.total += 1;
        *summary.by_kind.entry(record.kind.clone()).or_insert(0) += 1;
        *summary
            .by_owner
            .entry(owner.owner_type.to_string())
            .or_insert(0) += 1;
        if record.drifted {
            summary.drifted += 1;
        }

        entries.push(SnapshotEntry {
            id: record.id(),
            cluster: record.cluster.clone(),
            namespace: record.namespace.clone(),
            kind: record.kind.clone(),
            name: record.name.clone(),
            api_version: record.api_version.clone(),
            owner: Some(owner),
            labels: record.labels.clone(),
        });
    }

    let relations = build_relations(records);
    tracing::debug!(
        "Snapshot for {}: {} entries, {} relations",
        cluster,
        entries.len(),
        relations.len()
    );

    Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        generated_at,
        cluster: cluster.to_string(),
        entries,
        relations,
        summary,
    }
}
