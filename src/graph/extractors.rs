//! Relation extractors
//!
//! Each extractor is a pure function over the scanned records. They share no
//! state and can run in any order.

use crate::models::{
    RelationEdge, RelationType, ResourceId, ResourceKind, ResourceRecord, api_group,
};
use std::collections::{HashMap, HashSet};

/// Owner reference edges: `owner -> child`
///
/// Owners are looked up by UID among the scanned records. An owner whose kind
/// was not scanned gets an ID synthesized from the reference itself (in the
/// child's namespace) and the edge is marked partial.
pub fn build_owns_relations(records: &[ResourceRecord]) -> Vec<RelationEdge> {
    let by_uid: HashMap<&str, &ResourceRecord> = records
        .iter()
        .filter(|r| !r.uid.is_empty())
        .map(|r| (r.uid.as_str(), r))
        .collect();

    let mut edges = Vec::new();
    for child in records {
        if child.owner_references.is_empty() {
            continue;
        }
        let child_id = child.id();
        for owner_ref in &child.owner_references {
            let scanned = if owner_ref.uid.is_empty() {
                None
            } else {
                by_uid.get(owner_ref.uid.as_str())
            };
            let edge = match scanned {
                Some(owner) => RelationEdge::new(owner.id(), child_id.clone(), RelationType::Owns),
                None => RelationEdge::new(
                    ResourceId::new(
                        &child.cluster,
                        &child.namespace,
                        api_group(&owner_ref.api_version),
                        &owner_ref.kind,
                        &owner_ref.name,
                    ),
                    child_id.clone(),
                    RelationType::Owns,
                )
                .partial(true),
            };
            edges.push(edge);
        }
    }

    tracing::debug!("Built {} owns relations", edges.len());
    edges
}

/// Service selector edges: `service -> pod`
///
/// A pod matches when every selector entry is present among its labels with
/// the same value. Services without a selector select nothing.
pub fn build_selects_relations(records: &[ResourceRecord]) -> Vec<RelationEdge> {
    let mut pods_by_namespace: HashMap<&str, Vec<&ResourceRecord>> = HashMap::new();
    for pod in records.iter().filter(|r| r.is_kind(ResourceKind::Pod)) {
        pods_by_namespace
            .entry(pod.namespace.as_str())
            .or_default()
            .push(pod);
    }

    let mut edges = Vec::new();
    for service in records.iter().filter(|r| r.is_kind(ResourceKind::Service)) {
        if service.selector.is_empty() {
            continue;
        }
        let Some(pods) = pods_by_namespace.get(service.namespace.as_str()) else {
            continue;
        };
        let service_id = service.id();
        for pod in pods {
            let matches = service
                .selector
                .iter()
                .all(|(key, value)| pod.labels.get(key) == Some(value));
            if matches {
                edges.push(RelationEdge::new(
                    service_id.clone(),
                    pod.id(),
                    RelationType::Selects,
                ));
            }
        }
    }

    tracing::debug!("Built {} selects relations", edges.len());
    edges
}

fn core_target(pod: &ResourceRecord, kind: ResourceKind, name: &str) -> ResourceId {
    ResourceId::new(&pod.cluster, &pod.namespace, kind.group(), kind.as_str(), name)
}

/// Volume edges: `pod -> configmap|secret`
pub fn build_mounts_relations(records: &[ResourceRecord]) -> Vec<RelationEdge> {
    let mut edges = Vec::new();
    for pod in records.iter().filter(|r| r.is_kind(ResourceKind::Pod)) {
        let pod_id = pod.id();
        let mut seen = HashSet::new();
        for volume in &pod.volumes {
            let target = match (volume.config_map.as_deref(), volume.secret.as_deref()) {
                (Some(name), _) => (ResourceKind::ConfigMap, name),
                (None, Some(name)) => (ResourceKind::Secret, name),
                (None, None) => continue,
            };
            if !target.1.is_empty() && seen.insert(target) {
                edges.push(RelationEdge::new(
                    pod_id.clone(),
                    core_target(pod, target.0, target.1),
                    RelationType::Mounts,
                ));
            }
        }
    }

    tracing::debug!("Built {} mounts relations", edges.len());
    edges
}

/// Environment edges: `pod -> configmap|secret`
///
/// `envFrom` and `env[].valueFrom` both count; each target appears once per pod
/// no matter how many times it is referenced.
pub fn build_references_relations(records: &[ResourceRecord]) -> Vec<RelationEdge> {
    let mut edges = Vec::new();
    for pod in records.iter().filter(|r| r.is_kind(ResourceKind::Pod)) {
        let mut targets: Vec<(ResourceKind, &str)> = Vec::new();
        for container in &pod.containers {
            for source in &container.env_from {
                targets.extend(source.config_map.as_deref().map(|n| (ResourceKind::ConfigMap, n)));
                targets.extend(source.secret.as_deref().map(|n| (ResourceKind::Secret, n)));
            }
            for var in &container.env {
                targets.extend(var.config_map.as_deref().map(|n| (ResourceKind::ConfigMap, n)));
                targets.extend(var.secret.as_deref().map(|n| (ResourceKind::Secret, n)));
            }
        }

        let pod_id = pod.id();
        let mut seen = HashSet::new();
        for (kind, name) in targets {
            if name.is_empty() || !seen.insert((kind, name)) {
                continue;
            }
            edges.push(RelationEdge::new(
                pod_id.clone(),
                core_target(pod, kind, name),
                RelationType::References,
            ));
        }
    }

    tracing::debug!("Built {} references relations", edges.len());
    edges
}
