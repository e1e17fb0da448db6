//! Environment chain detection
//!
//! A workload deployed under the same name in several namespaces is treated
//! as one application promoted through environments.

use crate::models::ResourceRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One application seen in two or more namespaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvChain {
    pub app_name: String,
    /// namespace -> image
    pub environments: BTreeMap<String, String>,
}

impl EnvChain {
    /// Namespaces in promotion order (see [`env_priority`])
    pub fn ordered_namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self.environments.keys().map(String::as_str).collect();
        namespaces.sort_by(|a, b| env_priority(a).cmp(&env_priority(b)).then(a.cmp(b)));
        namespaces
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

/// Environment inferred from a namespace name
///
/// Substring match, checked in order: `prod`, then `staging`/`stage`, then
/// `dev`/`qa`. A namespace such as `qa-prod` is `prod`.
pub fn infer_env(namespace: &str) -> &'static str {
    let ns = namespace.to_lowercase();
    if ns.contains("prod") {
        "prod"
    } else if ns.contains("staging") || ns.contains("stage") {
        "staging"
    } else if ns.contains("dev") || ns.contains("qa") {
        "dev"
    } else {
        "default"
    }
}

/// Promotion rank of a namespace: dev/qa < staging/stage < prod < anything else
///
/// Ranks the environment [`infer_env`] picks, so ordering and tagging agree.
pub fn env_priority(namespace: &str) -> u8 {
    match infer_env(namespace) {
        "dev" => 0,
        "staging" => 1,
        "prod" => 2,
        _ => 3,
    }
}

/// Group workloads by name across namespaces
///
/// Only groups spanning at least `min_namespaces` namespaces are returned,
/// sorted by app name. When one namespace holds two workloads with the same
/// name, the first one's image is kept.
pub fn detect_env_chains(records: &[ResourceRecord], min_namespaces: usize) -> Vec<EnvChain> {
    let mut groups: BTreeMap<&str, BTreeMap<String, String>> = BTreeMap::new();

    for record in records {
        if !record.resource_kind().is_some_and(|k| k.is_workload()) || record.namespace.is_empty() {
            continue;
        }
        groups
            .entry(record.name.as_str())
            .or_default()
            .entry(record.namespace.clone())
            .or_insert_with(|| record.primary_image().unwrap_or_default().to_string());
    }

    let chains: Vec<EnvChain> = groups
        .into_iter()
        .filter(|(_, environments)| environments.len() >= min_namespaces.max(2))
        .map(|(app_name, environments)| EnvChain {
            app_name: app_name.to_string(),
            environments,
        })
        .collect();

    tracing::debug!("Detected {} environment chains", chains.len());
    chains
}
