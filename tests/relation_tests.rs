//! Relation graph tests
//!
//! Tests for the owns, selects, mounts, references and Crossplane extractors
//! and for the combined graph.

use gitops_scout::graph::{
    RelationGraph, build_crossplane_relations, build_mounts_relations, build_owns_relations,
    build_references_relations, build_relations, build_selects_relations,
};
use gitops_scout::models::{RelationType, ResourceRecord};
use serde_json::{Value, json};

fn record(obj: Value) -> ResourceRecord {
    ResourceRecord::from_value("prod", &obj).unwrap()
}

fn owner_ref(api_version: &str, kind: &str, name: &str, uid: &str) -> Value {
    json!({"apiVersion": api_version, "kind": kind, "name": name, "uid": uid, "controller": true})
}

fn deployment_chain() -> Vec<ResourceRecord> {
    vec![
        record(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "backend", "namespace": "prod", "uid": "d-1"}
        })),
        record(json!({
            "apiVersion": "apps/v1",
            "kind": "ReplicaSet",
            "metadata": {
                "name": "backend-5d8f",
                "namespace": "prod",
                "uid": "rs-1",
                "ownerReferences": [owner_ref("apps/v1", "Deployment", "backend", "d-1")]
            }
        })),
        record(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "backend-5d8f-x2",
                "namespace": "prod",
                "uid": "p-1",
                "labels": {"app": "backend"},
                "ownerReferences": [owner_ref("apps/v1", "ReplicaSet", "backend-5d8f", "rs-1")]
            }
        })),
    ]
}

fn pod(namespace: &str, name: &str, labels: Value) -> ResourceRecord {
    record(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": name, "namespace": namespace, "labels": labels}
    }))
}

fn service(namespace: &str, name: &str, selector: Option<Value>) -> ResourceRecord {
    let spec = match selector {
        Some(selector) => json!({"selector": selector}),
        None => json!({"type": "ExternalName", "externalName": "db.example.com"}),
    };
    record(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {"name": name, "namespace": namespace},
        "spec": spec
    }))
}

#[test]
fn test_owns_chain() {
    let edges = build_owns_relations(&deployment_chain());

    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.relation == RelationType::Owns));
    assert!(edges.iter().all(|e| !e.partial));
    assert_eq!(edges[0].from.as_str(), "prod/prod/apps/Deployment/backend");
    assert_eq!(edges[0].to.as_str(), "prod/prod/apps/ReplicaSet/backend-5d8f");
    assert_eq!(edges[1].from.as_str(), "prod/prod/apps/ReplicaSet/backend-5d8f");
    assert_eq!(edges[1].to.as_str(), "prod/prod//Pod/backend-5d8f-x2");
}

#[test]
fn test_owns_no_references() {
    let records = vec![pod("prod", "lonely", json!({}))];
    assert!(build_owns_relations(&records).is_empty());
}

#[test]
fn test_owns_unscanned_owner_is_partial() {
    let records = vec![record(json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {
            "name": "nightly-2891",
            "namespace": "ops",
            "ownerReferences": [owner_ref("batch/v1", "CronJob", "nightly", "cj-1")]
        }
    }))];

    let edges = build_owns_relations(&records);
    assert_eq!(edges.len(), 1);
    assert!(edges[0].partial);
    assert_eq!(edges[0].from.as_str(), "prod/ops/batch/CronJob/nightly");
}

#[test]
fn test_selects_same_namespace_only() {
    let records = vec![
        service("prod", "backend", Some(json!({"app": "backend"}))),
        pod("prod", "backend-1", json!({"app": "backend", "pod-template-hash": "abc"})),
        pod("prod", "frontend-1", json!({"app": "frontend"})),
        pod("staging", "backend-1", json!({"app": "backend"})),
    ];

    let edges = build_selects_relations(&records);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].relation, RelationType::Selects);
    assert_eq!(edges[0].from.as_str(), "prod/prod//Service/backend");
    assert_eq!(edges[0].to.as_str(), "prod/prod//Pod/backend-1");
}

#[test]
fn test_selects_requires_every_key() {
    let records = vec![
        service("prod", "api", Some(json!({"app": "api", "tier": "web"}))),
        pod("prod", "api-1", json!({"app": "api"})),
    ];
    assert!(build_selects_relations(&records).is_empty());
}

#[test]
fn test_service_without_selector_selects_nothing() {
    let records = vec![
        service("prod", "external-db", None),
        pod("prod", "backend-1", json!({"app": "backend"})),
    ];
    assert!(build_selects_relations(&records).is_empty());
}

#[test]
fn test_mounts_skip_non_config_volumes() {
    let records = vec![record(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": "web", "namespace": "prod"},
        "spec": {
            "containers": [{"name": "web", "image": "web:1"}],
            "volumes": [
                {"name": "config", "configMap": {"name": "web-config"}},
                {"name": "tls", "secret": {"secretName": "web-tls"}},
                {"name": "scratch", "emptyDir": {}}
            ]
        }
    }))];

    let edges = build_mounts_relations(&records);
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.relation == RelationType::Mounts));
    let targets: Vec<&str> = edges.iter().map(|e| e.to.as_str()).collect();
    assert!(targets.contains(&"prod/prod//ConfigMap/web-config"));
    assert!(targets.contains(&"prod/prod//Secret/web-tls"));
}

#[test]
fn test_references_deduplicated() {
    let records = vec![record(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": "api", "namespace": "prod"},
        "spec": {
            "containers": [{
                "name": "api",
                "image": "api:1",
                "envFrom": [{"secretRef": {"name": "db-creds"}}],
                "env": [
                    {"name": "DB_PASSWORD", "valueFrom": {"secretKeyRef": {"name": "db-creds", "key": "password"}}},
                    {"name": "PLAIN", "value": "1"}
                ]
            }]
        }
    }))];

    let edges = build_references_relations(&records);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].relation, RelationType::References);
    assert_eq!(edges[0].to.as_str(), "prod/prod//Secret/db-creds");
}

#[test]
fn test_crossplane_lineage() {
    let records = vec![
        record(json!({
            "apiVersion": "database.example.org/v1alpha1",
            "kind": "PostgresInstance",
            "metadata": {"name": "orders-db", "namespace": "shop"}
        })),
        record(json!({
            "apiVersion": "database.example.org/v1alpha1",
            "kind": "XPostgresInstance",
            "metadata": {
                "name": "orders-db-7xk2p",
                "labels": {
                    "crossplane.io/composite": "orders-db-7xk2p",
                    "crossplane.io/claim-name": "orders-db",
                    "crossplane.io/claim-namespace": "shop"
                }
            }
        })),
        record(json!({
            "apiVersion": "rds.aws.upbound.io/v1beta1",
            "kind": "Instance",
            "metadata": {
                "name": "orders-db-7xk2p-rds",
                "labels": {"crossplane.io/composite": "orders-db-7xk2p"}
            }
        })),
    ];

    let edges = build_crossplane_relations(&records);
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.relation == RelationType::Owns && !e.partial));
    assert!(edges.iter().any(|e| {
        e.from.as_str() == "prod/shop/database.example.org/PostgresInstance/orders-db"
            && e.to.as_str() == "prod//database.example.org/XPostgresInstance/orders-db-7xk2p"
    }));
}

#[test]
fn test_build_relations_unions_extractors() {
    let mut records = deployment_chain();
    records.push(service("prod", "backend", Some(json!({"app": "backend"}))));

    let edges = build_relations(&records);
    assert_eq!(edges.len(), 3);

    let graph = RelationGraph::new(edges);
    let counts = graph.count_by_type();
    assert_eq!(counts.get(&RelationType::Owns), Some(&2));
    assert_eq!(counts.get(&RelationType::Selects), Some(&1));

    let pod_id = records[2].id();
    assert_eq!(graph.edges_to(&pod_id).count(), 2);
    assert_eq!(graph.edges_from(&pod_id).count(), 0);
    assert_eq!(graph.edges_from(&records[0].id()).count(), 1);
}

#[test]
fn test_empty_input() {
    let graph = RelationGraph::build(&[]);
    assert!(graph.is_empty());
    assert_eq!(graph.len(), 0);
}
