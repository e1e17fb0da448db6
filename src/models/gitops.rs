//! GitOps controller objects
//!
//! Extracts Git sources and the path-based deployers that consume them from
//! raw Flux and Argo CD objects. These feed repository pattern detection.

use super::kind::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// GitOps tool(s) observed deploying from a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GitOpsTool {
    Flux,
    #[serde(rename = "ArgoCD")]
    ArgoCd,
    #[serde(rename = "Flux+ArgoCD")]
    FluxAndArgoCd,
}

impl GitOpsTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitOpsTool::Flux => "Flux",
            GitOpsTool::ArgoCd => "ArgoCD",
            GitOpsTool::FluxAndArgoCd => "Flux+ArgoCD",
        }
    }

    /// Combine two observations of the same repository
    pub fn merge(self, other: GitOpsTool) -> GitOpsTool {
        if self == other {
            self
        } else {
            GitOpsTool::FluxAndArgoCd
        }
    }
}

impl fmt::Display for GitOpsTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source reference from Kustomization or HelmRelease
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

/// A Flux GitRepository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    pub namespace: String,
    pub name: String,
    pub url: String,
}

/// A Kustomization, HelmRelease or Application deploying a path from Git
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployer {
    pub tool: GitOpsTool,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    /// Path inside the repository (may be empty)
    pub path: String,
    /// Set directly by Argo CD; Flux deployers resolve through `source_ref`
    pub repo_url: Option<String>,
    pub source_ref: Option<SourceRef>,
}

fn str_at<'a>(obj: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = obj;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str()
}

fn metadata(obj: &Value) -> (String, String) {
    (
        str_at(obj, &["metadata", "namespace"])
            .unwrap_or("")
            .to_string(),
        str_at(obj, &["metadata", "name"]).unwrap_or("").to_string(),
    )
}

fn parse_source_ref(obj: Option<&Value>, default_ns: &str) -> Option<SourceRef> {
    let source_ref = obj?;
    Some(SourceRef {
        kind: source_ref.get("kind")?.as_str()?.to_string(),
        name: source_ref.get("name")?.as_str()?.to_string(),
        namespace: source_ref
            .get("namespace")
            .and_then(|n| n.as_str())
            .unwrap_or(default_ns)
            .to_string(),
    })
}

/// Extract Flux GitRepositories from raw objects
pub fn extract_git_sources(objects: &[Value]) -> Vec<GitSource> {
    objects
        .iter()
        .filter(|obj| {
            str_at(obj, &["kind"]) == Some(ResourceKind::GitRepository.as_str())
        })
        .filter_map(|obj| {
            let (namespace, name) = metadata(obj);
            let url = str_at(obj, &["spec", "url"])?.to_string();
            Some(GitSource {
                namespace,
                name,
                url,
            })
        })
        .collect()
}

/// Extract deployers (Kustomization, HelmRelease, Application) from raw objects
pub fn extract_deployers(objects: &[Value]) -> Vec<Deployer> {
    let mut deployers = Vec::new();

    for obj in objects {
        let (namespace, name) = metadata(obj);
        match str_at(obj, &["kind"]).and_then(ResourceKind::parse_optional) {
            Some(ResourceKind::Kustomization) => {
                deployers.push(Deployer {
                    tool: GitOpsTool::Flux,
                    kind: ResourceKind::Kustomization.as_str().to_string(),
                    path: str_at(obj, &["spec", "path"]).unwrap_or("").to_string(),
                    repo_url: None,
                    source_ref: parse_source_ref(
                        obj.get("spec").and_then(|s| s.get("sourceRef")),
                        &namespace,
                    ),
                    namespace,
                    name,
                });
            }
            Some(ResourceKind::HelmRelease) => {
                let chart_spec = obj
                    .get("spec")
                    .and_then(|s| s.get("chart"))
                    .and_then(|c| c.get("spec"));
                let source_ref =
                    parse_source_ref(chart_spec.and_then(|c| c.get("sourceRef")), &namespace);
                // Charts from HelmRepository/OCIRepository are not Git paths
                if source_ref.as_ref().map(|r| r.kind.as_str())
                    != Some(ResourceKind::GitRepository.as_str())
                {
                    continue;
                }
                deployers.push(Deployer {
                    tool: GitOpsTool::Flux,
                    kind: ResourceKind::HelmRelease.as_str().to_string(),
                    path: chart_spec
                        .and_then(|c| c.get("chart"))
                        .and_then(|c| c.as_str())
                        .unwrap_or("")
                        .to_string(),
                    repo_url: None,
                    source_ref,
                    namespace,
                    name,
                });
            }
            Some(ResourceKind::Application) => {
                let spec = obj.get("spec");
                let single = spec.and_then(|s| s.get("source")).into_iter();
                let multi = spec
                    .and_then(|s| s.get("sources"))
                    .and_then(|s| s.as_array())
                    .into_iter()
                    .flatten();
                for source in single.chain(multi) {
                    let Some(repo_url) = source.get("repoURL").and_then(|u| u.as_str()) else {
                        continue;
                    };
                    deployers.push(Deployer {
                        tool: GitOpsTool::ArgoCd,
                        kind: ResourceKind::Application.as_str().to_string(),
                        namespace: namespace.clone(),
                        name: name.clone(),
                        path: source
                            .get("path")
                            .and_then(|p| p.as_str())
                            .unwrap_or("")
                            .to_string(),
                        repo_url: Some(repo_url.to_string()),
                        source_ref: None,
                    });
                }
            }
            _ => {}
        }
    }

    deployers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_merge() {
        assert_eq!(GitOpsTool::Flux.merge(GitOpsTool::Flux), GitOpsTool::Flux);
        assert_eq!(
            GitOpsTool::Flux.merge(GitOpsTool::ArgoCd),
            GitOpsTool::FluxAndArgoCd
        );
        assert_eq!(
            GitOpsTool::FluxAndArgoCd.merge(GitOpsTool::ArgoCd),
            GitOpsTool::FluxAndArgoCd
        );
    }

    #[test]
    fn test_extract_git_sources() {
        let objects = vec![
            json!({
                "kind": "GitRepository",
                "metadata": {"name": "flux-system", "namespace": "flux-system"},
                "spec": {"url": "https://github.com/acme/fleet-infra"}
            }),
            json!({"kind": "ConfigMap", "metadata": {"name": "x"}}),
        ];

        let sources = extract_git_sources(&objects);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://github.com/acme/fleet-infra");
    }

    #[test]
    fn test_extract_kustomization_defaults_source_namespace() {
        let objects = vec![json!({
            "kind": "Kustomization",
            "metadata": {"name": "apps", "namespace": "flux-system"},
            "spec": {"path": "./apps/prod", "sourceRef": {"kind": "GitRepository", "name": "flux-system"}}
        })];

        let deployers = extract_deployers(&objects);
        assert_eq!(deployers.len(), 1);
        let source_ref = deployers[0].source_ref.as_ref().unwrap();
        assert_eq!(source_ref.namespace, "flux-system");
        assert_eq!(deployers[0].path, "./apps/prod");
    }

    #[test]
    fn test_extract_helmrelease_skips_helm_repositories() {
        let objects = vec![
            json!({
                "kind": "HelmRelease",
                "metadata": {"name": "podinfo", "namespace": "apps"},
                "spec": {"chart": {"spec": {"chart": "podinfo", "sourceRef": {"kind": "HelmRepository", "name": "podinfo"}}}}
            }),
            json!({
                "kind": "HelmRelease",
                "metadata": {"name": "local", "namespace": "apps"},
                "spec": {"chart": {"spec": {"chart": "./charts/local", "sourceRef": {"kind": "GitRepository", "name": "repo"}}}}
            }),
        ];

        let deployers = extract_deployers(&objects);
        assert_eq!(deployers.len(), 1);
        assert_eq!(deployers[0].name, "local");
        assert_eq!(deployers[0].path, "./charts/local");
    }

    #[test]
    fn test_extract_application_multi_source() {
        let objects = vec![json!({
            "kind": "Application",
            "metadata": {"name": "guestbook", "namespace": "argocd"},
            "spec": {"sources": [
                {"repoURL": "https://github.com/acme/charts", "path": "guestbook"},
                {"repoURL": "https://github.com/acme/values", "path": "envs/prod"}
            ]}
        })];

        let deployers = extract_deployers(&objects);
        assert_eq!(deployers.len(), 2);
        assert!(deployers.iter().all(|d| d.tool == GitOpsTool::ArgoCd));
        assert_eq!(deployers[1].path, "envs/prod");
    }
}
