//! Crossplane composition lineage
//!
//! Claim -> composite resource (XR) -> managed resources, from the labels
//! Crossplane stamps on composed objects:
//! - `crossplane.io/composite` on the XR (its own name) and on everything it composes
//! - `crossplane.io/claim-name` / `crossplane.io/claim-namespace` on the XR of a claim
//!
//! Parents that were not scanned get a synthesized ID and the edge is partial,
//! the same convention the owner reference extractor uses.

use crate::models::{RelationEdge, RelationType, ResourceId, ResourceRecord};
use crate::ownership::{CROSSPLANE_CLAIM_NAME, CROSSPLANE_CLAIM_NAMESPACE, CROSSPLANE_COMPOSITE};
use std::collections::HashMap;

const SYNTHETIC_COMPOSITE_KIND: &str = "Composite";
const SYNTHETIC_CLAIM_KIND: &str = "Claim";

fn is_composite(record: &ResourceRecord) -> bool {
    record.label(CROSSPLANE_COMPOSITE) == Some(record.name.as_str())
}

fn is_claim_candidate(record: &ResourceRecord) -> bool {
    !record.api_group().is_empty() && !is_composite(record) && record.resource_kind().is_none()
}

/// Build `owns` edges along Crossplane composition chains
pub fn build_crossplane_relations(records: &[ResourceRecord]) -> Vec<RelationEdge> {
    // First record wins on duplicate keys
    let mut composites: HashMap<&str, &ResourceRecord> = HashMap::new();
    let mut claims: HashMap<(&str, &str), &ResourceRecord> = HashMap::new();
    for record in records {
        if is_composite(record) {
            composites.entry(record.name.as_str()).or_insert(record);
        } else if is_claim_candidate(record) {
            claims
                .entry((record.namespace.as_str(), record.name.as_str()))
                .or_insert(record);
        }
    }

    let mut edges = Vec::new();

    for record in records {
        let Some(composite) = record.label(CROSSPLANE_COMPOSITE) else {
            continue;
        };

        if is_composite(record) {
            // XR -> claim
            if let (Some(claim_name), Some(claim_namespace)) = (
                record.label(CROSSPLANE_CLAIM_NAME),
                record.label(CROSSPLANE_CLAIM_NAMESPACE),
            ) {
                let claim = claims.get(&(claim_namespace, claim_name));
                edges.push(match claim {
                    Some(claim) => RelationEdge::new(claim.id(), record.id(), RelationType::Owns),
                    None => RelationEdge::new(
                        ResourceId::new(
                            &record.cluster,
                            claim_namespace,
                            "",
                            SYNTHETIC_CLAIM_KIND,
                            claim_name,
                        ),
                        record.id(),
                        RelationType::Owns,
                    )
                    .partial(true),
                });
            }
            continue;
        }

        // XR -> managed resource
        edges.push(match composites.get(composite) {
            Some(xr) => RelationEdge::new(xr.id(), record.id(), RelationType::Owns),
            None => RelationEdge::new(
                ResourceId::new(&record.cluster, "", "", SYNTHETIC_COMPOSITE_KIND, composite),
                record.id(),
                RelationType::Owns,
            )
            .partial(true),
        });
    }

    tracing::debug!("Built {} crossplane relations", edges.len());
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(
        kind: &str,
        api_version: &str,
        namespace: &str,
        name: &str,
        labels: &[(&str, &str)],
    ) -> ResourceRecord {
        let mut record = ResourceRecord::new(kind, namespace, name);
        record.api_version = api_version.to_string();
        record.labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        record
    }

    #[test]
    fn test_full_chain() {
        let claim = labelled("PostgresInstance", "db.acme.io/v1", "team-a", "orders-db", &[]);
        let xr = labelled(
            "XPostgresInstance",
            "db.acme.io/v1",
            "",
            "orders-db-x7k2",
            &[
                (CROSSPLANE_COMPOSITE, "orders-db-x7k2"),
                (CROSSPLANE_CLAIM_NAME, "orders-db"),
                (CROSSPLANE_CLAIM_NAMESPACE, "team-a"),
            ],
        );
        let managed = labelled(
            "Instance",
            "rds.aws.upbound.io/v1beta1",
            "",
            "orders-db-x7k2-rds",
            &[(CROSSPLANE_COMPOSITE, "orders-db-x7k2")],
        );

        let edges = build_crossplane_relations(&[claim.clone(), xr.clone(), managed.clone()]);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| !e.partial));
        assert!(edges.iter().any(|e| e.from == claim.id() && e.to == xr.id()));
        assert!(edges.iter().any(|e| e.from == xr.id() && e.to == managed.id()));
    }

    #[test]
    fn test_managed_resources_share_one_composite() {
        let xr = labelled(
            "XNetwork",
            "net.acme.io/v1",
            "",
            "edge-9qz",
            &[(CROSSPLANE_COMPOSITE, "edge-9qz")],
        );
        let mut records = vec![xr.clone()];
        for name in ["vpc", "subnet-a", "subnet-b"] {
            records.push(labelled(
                "Subnet",
                "ec2.aws.upbound.io/v1beta1",
                "",
                name,
                &[(CROSSPLANE_COMPOSITE, "edge-9qz")],
            ));
        }

        let edges = build_crossplane_relations(&records);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.from == xr.id() && !e.partial));
    }

    #[test]
    fn test_missing_composite_is_synthesized() {
        let managed = labelled(
            "Bucket",
            "s3.aws.upbound.io/v1beta1",
            "",
            "assets",
            &[(CROSSPLANE_COMPOSITE, "assets-xyz")],
        );

        let edges = build_crossplane_relations(&[managed]);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].partial);
        assert_eq!(edges[0].from.as_str(), "///Composite/assets-xyz");
    }
}
