//! Listing scan targets from the Kubernetes API
//!
//! Every target kind is listed through `DynamicObject` so Flux and Argo CD
//! CRDs need no generated types. A kind that cannot be listed (CRD not
//! installed, RBAC forbidden) contributes no objects; the scan carries on.

use crate::models::ResourceKind;
use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::Api;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, TypeMeta};
use serde_json::Value;

/// Source of raw cluster objects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// List every object of `kind`, in one namespace or cluster-wide
    async fn list(&self, kind: ResourceKind, namespace: Option<String>) -> Result<Vec<Value>>;
}

/// `ApiResource` for a scan target kind
pub fn api_resource(kind: ResourceKind) -> ApiResource {
    let group = kind.group();
    let version = kind.version();
    let api_version = if group.is_empty() {
        version.to_string()
    } else {
        format!("{}/{}", group, version)
    };
    ApiResource {
        group: group.to_string(),
        version: version.to_string(),
        api_version,
        kind: kind.as_str().to_string(),
        plural: kind.plural().to_string(),
    }
}

/// Lister backed by a live cluster
pub struct KubeLister {
    client: kube::Client,
}

impl KubeLister {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectLister for KubeLister {
    async fn list(&self, kind: ResourceKind, namespace: Option<String>) -> Result<Vec<Value>> {
        let api_resource = api_resource(kind);
        let api: Api<DynamicObject> = match namespace.as_deref() {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &api_resource),
            None => Api::all_with(self.client.clone(), &api_resource),
        };

        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("Failed to list {}", api_resource.plural))?;

        list.items
            .into_iter()
            .map(|mut obj| {
                // List responses omit kind/apiVersion on items
                if obj.types.is_none() {
                    obj.types = Some(TypeMeta {
                        api_version: api_resource.api_version.clone(),
                        kind: api_resource.kind.clone(),
                    });
                }
                serde_json::to_value(&obj).context("Failed to serialize object to JSON")
            })
            .collect()
    }
}

/// List every scan target kind
///
/// Kinds are listed one after another. A failing kind is logged and yields
/// nothing. The result is scoped with [`scope_objects`].
pub async fn collect(
    lister: &dyn ObjectLister,
    namespace: Option<&str>,
    exclude_namespaces: &[String],
) -> Vec<Value> {
    let mut objects = Vec::new();

    for &kind in ResourceKind::all() {
        match lister.list(kind, namespace.map(str::to_string)).await {
            Ok(items) => {
                tracing::debug!("Listed {} {} objects", items.len(), kind);
                objects.extend(items);
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {:#}", kind, e);
            }
        }
    }

    scope_objects(objects, namespace, exclude_namespaces)
}

/// Restrict objects to the scanned namespaces
///
/// With an explicit namespace only that namespace is kept and exclusions do
/// not apply. Otherwise objects in `exclude_namespaces` are dropped.
pub fn scope_objects(
    objects: Vec<Value>,
    namespace: Option<&str>,
    exclude_namespaces: &[String],
) -> Vec<Value> {
    objects
        .into_iter()
        .filter(|obj| {
            let obj_ns = obj
                .get("metadata")
                .and_then(|m| m.get("namespace"))
                .and_then(|ns| ns.as_str())
                .unwrap_or("");
            match namespace {
                Some(ns) => obj_ns == ns,
                None => !exclude_namespaces.iter().any(|excluded| excluded == obj_ns),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod(ns: &str, name: &str) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"namespace": ns, "name": name}
        })
    }

    #[test]
    fn test_api_resource_core_and_crd() {
        let pods = api_resource(ResourceKind::Pod);
        assert_eq!(pods.api_version, "v1");
        assert_eq!(pods.plural, "pods");

        let apps = api_resource(ResourceKind::Application);
        assert_eq!(apps.api_version, "argoproj.io/v1alpha1");
        assert_eq!(apps.group, "argoproj.io");
    }

    #[tokio::test]
    async fn test_failing_kind_degrades_to_empty() {
        let mut lister = MockObjectLister::new();
        lister.expect_list().returning(|kind, _| match kind {
            ResourceKind::Pod => Ok(vec![pod("web", "api-0")]),
            ResourceKind::Application => {
                Err(anyhow::anyhow!("the server could not find the requested resource"))
            }
            _ => Ok(vec![]),
        });

        let objects = collect(&lister, None, &[]).await;
        assert_eq!(objects.len(), 1);
    }

    #[tokio::test]
    async fn test_excluded_namespaces_dropped_cluster_wide() {
        let mut lister = MockObjectLister::new();
        lister.expect_list().returning(|kind, _| match kind {
            ResourceKind::Pod => Ok(vec![pod("kube-system", "coredns"), pod("web", "api-0")]),
            _ => Ok(vec![]),
        });

        let exclude = vec!["kube-system".to_string()];
        let objects = collect(&lister, None, &exclude).await;
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["metadata"]["name"], "api-0");
    }

    #[tokio::test]
    async fn test_explicit_namespace_is_passed_and_not_excluded() {
        let mut lister = MockObjectLister::new();
        lister
            .expect_list()
            .withf(|_, ns| ns.as_deref() == Some("kube-system"))
            .returning(|kind, _| match kind {
                ResourceKind::Pod => Ok(vec![pod("kube-system", "coredns")]),
                _ => Ok(vec![]),
            });

        let exclude = vec!["kube-system".to_string()];
        let objects = collect(&lister, Some("kube-system"), &exclude).await;
        assert_eq!(objects.len(), 1);
    }

    #[test]
    fn test_scope_objects_to_namespace() {
        let objects = vec![pod("web", "a"), pod("db", "b")];
        let scoped = scope_objects(objects, Some("db"), &[]);
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0]["metadata"]["name"], "b");
    }
}
