//! Configuration system for gitops-scout
//!
//! Layered YAML configuration (defaults, root file, per-cluster file,
//! environment) holding every threshold the inference engine uses. The engine
//! itself never loads configuration; callers pass the relevant section in.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, OutputFormat, OwnershipConfig, PatternConfig, ScanConfig};

use anyhow::Context;

fn parse_list(value: &str) -> anyhow::Result<Vec<String>> {
    if value.trim_start().starts_with('[') {
        serde_yaml::from_str(value).context("expected a YAML array (e.g., ['a', 'b'])")
    } else {
        Ok(value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    let list = |items: &Vec<String>| items.join(",");
    match key {
        "cluster" => Ok(config.cluster.clone()),
        "output" => Ok(config.output.to_string()),
        "ownership.fluxNamespace" => Ok(config.ownership.flux_namespace.clone()),
        "ownership.argocdNamespace" => Ok(config.ownership.argocd_namespace.clone()),
        "patterns.monorepoThreshold" => Ok(config.patterns.monorepo_threshold.to_string()),
        "patterns.platformKeywords" => Ok(list(&config.patterns.platform_keywords)),
        "patterns.externalOwners" => Ok(list(&config.patterns.external_owners)),
        "patterns.teamPrefix" => Ok(config.patterns.team_prefix.clone()),
        "patterns.minChainNamespaces" => Ok(config.patterns.min_chain_namespaces.to_string()),
        "patterns.minHubEnvironments" => Ok(config.patterns.min_hub_environments.to_string()),
        "scan.excludeNamespaces" => Ok(list(&config.scan.exclude_namespaces)),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "cluster" => {
            config.cluster = value.to_string();
        }
        "output" => {
            config.output = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        "ownership.fluxNamespace" => {
            config.ownership.flux_namespace = value.to_string();
        }
        "ownership.argocdNamespace" => {
            config.ownership.argocd_namespace = value.to_string();
        }
        "patterns.monorepoThreshold" => {
            config.patterns.monorepo_threshold = value
                .parse()
                .context("patterns.monorepoThreshold must be a number")?;
        }
        "patterns.platformKeywords" => {
            config.patterns.platform_keywords =
                parse_list(value).context("patterns.platformKeywords")?;
        }
        "patterns.externalOwners" => {
            config.patterns.external_owners =
                parse_list(value).context("patterns.externalOwners")?;
        }
        "patterns.teamPrefix" => {
            config.patterns.team_prefix = value.to_string();
        }
        "patterns.minChainNamespaces" => {
            config.patterns.min_chain_namespaces = value
                .parse()
                .context("patterns.minChainNamespaces must be a number")?;
        }
        "patterns.minHubEnvironments" => {
            config.patterns.min_hub_environments = value
                .parse()
                .context("patterns.minHubEnvironments must be a number")?;
        }
        "scan.excludeNamespaces" => {
            config.scan.exclude_namespaces =
                parse_list(value).context("scan.excludeNamespaces")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
