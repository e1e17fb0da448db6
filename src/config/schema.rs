//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Cluster name recorded in snapshots and resource IDs
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Output format for snapshot and suggest commands
    #[serde(default)]
    pub output: OutputFormat,

    /// Ownership resolution settings
    #[serde(default)]
    pub ownership: OwnershipConfig,

    /// Repository, team and organization heuristics
    #[serde(default)]
    pub patterns: PatternConfig,

    /// Collection settings
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {} (expected yaml or json)", s)),
        }
    }
}

/// Ownership resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipConfig {
    /// Namespace assumed for Flux owners when the namespace label is absent
    #[serde(default = "default_flux_namespace")]
    pub flux_namespace: String,

    /// Namespace assumed for Argo CD Applications
    #[serde(default = "default_argocd_namespace")]
    pub argocd_namespace: String,
}

/// Pattern detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternConfig {
    /// A repo with more apps or paths than this is a monorepo
    #[serde(default = "default_monorepo_threshold")]
    pub monorepo_threshold: usize,

    /// Repo name substrings marking a platform repo
    #[serde(default = "default_platform_keywords")]
    pub platform_keywords: Vec<String>,

    /// Repo owner substrings marking upstream (external) repos
    #[serde(default = "default_external_owners")]
    pub external_owners: Vec<String>,

    /// Namespace prefix identifying team namespaces
    #[serde(default = "default_team_prefix")]
    pub team_prefix: String,

    /// Namespaces a workload must appear in to form an environment chain
    #[serde(default = "default_min_chain_namespaces")]
    pub min_chain_namespaces: usize,

    /// Environments a chain needs to get its own hub
    #[serde(default = "default_min_hub_environments")]
    pub min_hub_environments: usize,
}

/// Collection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Namespaces skipped during collection
    #[serde(default = "default_exclude_namespaces")]
    pub exclude_namespaces: Vec<String>,
}

// Default value functions
fn default_cluster() -> String {
    "default".to_string()
}

fn default_flux_namespace() -> String {
    "flux-system".to_string()
}

fn default_argocd_namespace() -> String {
    "argocd".to_string()
}

fn default_monorepo_threshold() -> usize {
    3
}

fn default_platform_keywords() -> Vec<String> {
    ["platform", "infrastructure", "infra"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_external_owners() -> Vec<String> {
    [
        "fluxcd",
        "argoproj",
        "stefanprodan",
        "controlplaneio-fluxcd",
        "kubernetes-sigs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_team_prefix() -> String {
    "team-".to_string()
}

fn default_min_chain_namespaces() -> usize {
    2
}

fn default_min_hub_environments() -> usize {
    3
}

fn default_exclude_namespaces() -> Vec<String> {
    ["kube-system", "kube-public", "kube-node-lease"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster: default_cluster(),
            output: OutputFormat::default(),
            ownership: OwnershipConfig::default(),
            patterns: PatternConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            flux_namespace: default_flux_namespace(),
            argocd_namespace: default_argocd_namespace(),
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            monorepo_threshold: default_monorepo_threshold(),
            platform_keywords: default_platform_keywords(),
            external_owners: default_external_owners(),
            team_prefix: default_team_prefix(),
            min_chain_namespaces: default_min_chain_namespaces(),
            min_hub_environments: default_min_hub_environments(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_namespaces: default_exclude_namespaces(),
        }
    }
}
