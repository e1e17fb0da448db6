//! Suggested organization synthesis
//!
//! Turns repository, team and environment chain patterns into a suggested
//! organization -> hub -> app space hierarchy. Each rule adds hubs to an
//! accumulate-only map: a hub created by an earlier rule is never replaced by
//! a later one.

use super::env_chain::{EnvChain, infer_env};
use super::repo::{PatternType, RepoPattern};
use super::team::TeamPattern;
use crate::config::PatternConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PLATFORM_HUB: &str = "platform";

/// A suggested sub-workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSpace {
    pub name: String,
    pub workloads: Vec<String>,
    pub env: String,
    /// Estimated workload count when individual workloads are not known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedHub {
    pub name: String,
    pub app_spaces: Vec<SuggestedSpace>,
}

impl SuggestedHub {
    /// Add a space unless one with the same name exists
    pub fn add_space(&mut self, space: SuggestedSpace) -> bool {
        if self.app_spaces.iter().any(|s| s.name == space.name) {
            return false;
        }
        self.app_spaces.push(space);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedOrg {
    pub organization: String,
    pub hubs: Vec<SuggestedHub>,
}

impl SuggestedOrg {
    pub fn hub(&self, name: &str) -> Option<&SuggestedHub> {
        self.hubs.iter().find(|h| h.name == name)
    }
}

/// Most frequent owner across non-external repositories
///
/// Ties keep the owner seen first.
pub fn infer_org_owner(repos: &[RepoPattern]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for repo in repos {
        if repo.pattern_type == PatternType::External || repo.owner.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(owner, _)| *owner == repo.owner) {
            Some((_, count)) => *count += 1,
            None => counts.push((repo.owner.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (owner, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((owner, count));
        }
    }
    best.map(|(owner, _)| owner.to_string())
}

/// Whether `insert_or_get` created the hub or found an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubSlot {
    Created,
    Existing,
}

/// Accumulate-only hub map
#[derive(Debug, Default)]
pub struct HubMapBuilder {
    hubs: HashMap<String, SuggestedHub>,
}

impl HubMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_or_get(&mut self, name: &str) -> (&mut SuggestedHub, HubSlot) {
        let mut slot = HubSlot::Existing;
        let hub = self.hubs.entry(name.to_string()).or_insert_with(|| {
            slot = HubSlot::Created;
            SuggestedHub {
                name: name.to_string(),
                app_spaces: Vec::new(),
            }
        });
        (hub, slot)
    }

    /// Hubs sorted by name
    pub fn finish(self) -> Vec<SuggestedHub> {
        let mut hubs: Vec<SuggestedHub> = self.hubs.into_values().collect();
        hubs.sort_by(|a, b| a.name.cmp(&b.name));
        hubs
    }
}

fn add_platform_hub(builder: &mut HubMapBuilder, repos: &[RepoPattern]) {
    for repo in repos
        .iter()
        .filter(|r| r.pattern_type == PatternType::Platform)
    {
        let (hub, _) = builder.insert_or_get(PLATFORM_HUB);
        for app in &repo.apps {
            hub.add_space(SuggestedSpace {
                name: app.clone(),
                workloads: vec![app.clone()],
                env: "shared".to_string(),
                workload_count: None,
            });
        }
    }
}

fn add_team_hubs(builder: &mut HubMapBuilder, teams: &[TeamPattern]) {
    for team in teams {
        let (hub, slot) = builder.insert_or_get(&team.name);
        if slot == HubSlot::Existing {
            tracing::debug!("Hub {} already exists, skipping team", team.name);
            continue;
        }
        let per_namespace = team.workloads / team.namespaces.len().max(1);
        for namespace in &team.namespaces {
            hub.add_space(SuggestedSpace {
                name: namespace.clone(),
                workloads: Vec::new(),
                env: infer_env(namespace).to_string(),
                workload_count: Some(per_namespace),
            });
        }
    }
}

fn add_chain_hubs(builder: &mut HubMapBuilder, chains: &[EnvChain], min_environments: usize) {
    for chain in chains.iter().filter(|c| c.len() >= min_environments) {
        let (hub, slot) = builder.insert_or_get(&chain.app_name);
        if slot == HubSlot::Existing {
            tracing::debug!("Hub {} already exists, skipping chain", chain.app_name);
            continue;
        }
        for namespace in chain.ordered_namespaces() {
            let env = infer_env(namespace);
            let mut name = format!("{}-{}", chain.app_name, env);
            // Namespaces sharing an environment get the namespace appended
            if hub.app_spaces.iter().any(|s| s.name == name) {
                name = format!("{}-{}", name, namespace);
            }
            hub.add_space(SuggestedSpace {
                name,
                workloads: vec![chain.app_name.clone()],
                env: env.to_string(),
                workload_count: None,
            });
        }
    }
}

/// Synthesize the suggested organization
///
/// Rules: platform repos share one `platform` hub, each team gets a hub, each
/// chain with at least `min_hub_environments` environments gets a hub.
/// The organization is empty when no owner can be inferred.
pub fn synthesize_org(
    repos: &[RepoPattern],
    teams: &[TeamPattern],
    chains: &[EnvChain],
    config: &PatternConfig,
) -> SuggestedOrg {
    let mut builder = HubMapBuilder::new();
    add_platform_hub(&mut builder, repos);
    add_team_hubs(&mut builder, teams);
    add_chain_hubs(&mut builder, chains, config.min_hub_environments);

    SuggestedOrg {
        organization: infer_org_owner(repos).unwrap_or_default(),
        hubs: builder.finish(),
    }
}
