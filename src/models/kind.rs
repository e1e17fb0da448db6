//! Resource Kind definitions
//!
//! This module provides a centralized enum for every Kubernetes kind the scanner
//! understands. This eliminates hardcoded strings throughout the codebase and
//! provides type safety for resource kind references.

use std::fmt;
use std::str::FromStr;

/// Enumeration of all resource kinds with dedicated handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    // Core resources
    Pod,
    Service,
    ConfigMap,
    Secret,
    // Workloads
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    // Flux resources
    GitRepository,
    Kustomization,
    HelmRelease,
    // Argo CD resources
    Application,
}

impl ResourceKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::Job => "Job",
            ResourceKind::GitRepository => "GitRepository",
            ResourceKind::Kustomization => "Kustomization",
            ResourceKind::HelmRelease => "HelmRelease",
            ResourceKind::Application => "Application",
        }
    }

    /// API group (empty for the core group)
    pub fn group(&self) -> &'static str {
        match self {
            ResourceKind::Pod
            | ResourceKind::Service
            | ResourceKind::ConfigMap
            | ResourceKind::Secret => "",
            ResourceKind::Deployment
            | ResourceKind::StatefulSet
            | ResourceKind::DaemonSet
            | ResourceKind::ReplicaSet => "apps",
            ResourceKind::Job => "batch",
            ResourceKind::GitRepository => "source.toolkit.fluxcd.io",
            ResourceKind::Kustomization => "kustomize.toolkit.fluxcd.io",
            ResourceKind::HelmRelease => "helm.toolkit.fluxcd.io",
            ResourceKind::Application => "argoproj.io",
        }
    }

    /// Served API version used when listing
    pub fn version(&self) -> &'static str {
        match self {
            ResourceKind::HelmRelease => "v2",
            ResourceKind::Application => "v1alpha1",
            _ => "v1",
        }
    }

    /// Plural resource name (from the CRD `spec.names.plural`)
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "pods",
            ResourceKind::Service => "services",
            ResourceKind::ConfigMap => "configmaps",
            ResourceKind::Secret => "secrets",
            ResourceKind::Deployment => "deployments",
            ResourceKind::StatefulSet => "statefulsets",
            ResourceKind::DaemonSet => "daemonsets",
            ResourceKind::ReplicaSet => "replicasets",
            ResourceKind::Job => "jobs",
            ResourceKind::GitRepository => "gitrepositories",
            ResourceKind::Kustomization => "kustomizations",
            ResourceKind::HelmRelease => "helmreleases",
            ResourceKind::Application => "applications",
        }
    }

    /// Long-running workloads that are grouped into environment chains
    pub fn is_workload(&self) -> bool {
        matches!(
            self,
            ResourceKind::Deployment | ResourceKind::StatefulSet | ResourceKind::DaemonSet
        )
    }

    /// Kinds whose spec embeds a pod template
    pub fn has_pod_template(&self) -> bool {
        matches!(
            self,
            ResourceKind::Deployment
                | ResourceKind::StatefulSet
                | ResourceKind::DaemonSet
                | ResourceKind::ReplicaSet
                | ResourceKind::Job
        )
    }

    /// Try to parse a string into a ResourceKind, returning None if invalid
    /// Use this when you want Option<Self> instead of Result<Self, String>
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all resource kinds
    ///
    /// This is the default scan target list.
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Pod,
            ResourceKind::Service,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::Deployment,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::ReplicaSet,
            ResourceKind::Job,
            ResourceKind::GitRepository,
            ResourceKind::Kustomization,
            ResourceKind::HelmRelease,
            ResourceKind::Application,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(ResourceKind::GitRepository.as_str(), "GitRepository");
        assert_eq!(ResourceKind::Pod.as_str(), "Pod");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            ResourceKind::parse_optional("Deployment"),
            Some(ResourceKind::Deployment)
        );
        assert_eq!(ResourceKind::parse_optional("deployment"), None);
        assert_eq!(ResourceKind::parse_optional("Unknown"), None);
    }

    #[test]
    fn test_workload_kinds() {
        assert!(ResourceKind::Deployment.is_workload());
        assert!(ResourceKind::DaemonSet.is_workload());
        assert!(!ResourceKind::ReplicaSet.is_workload());
        assert!(ResourceKind::ReplicaSet.has_pod_template());
        assert!(!ResourceKind::Pod.has_pod_template());
    }

    #[test]
    fn test_core_group_is_empty() {
        assert_eq!(ResourceKind::Secret.group(), "");
        assert_eq!(ResourceKind::StatefulSet.group(), "apps");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ResourceKind::HelmRelease), "HelmRelease");
        let s: String = ResourceKind::Application.into();
        assert_eq!(s, "Application");
    }
}
