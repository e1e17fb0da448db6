//! Pattern analysis
//!
//! Infers how a cluster's GitOps setup is organized:
//! - `repo.rs` - Repository accumulation and classification
//! - `named.rs` - Well-known repository layouts
//! - `env_chain.rs` - Apps promoted through environment namespaces
//! - `team.rs` - Team ownership from namespace naming
//! - `org.rs` - Suggested organization -> hub -> app space hierarchy

pub mod env_chain;
pub mod named;
pub mod org;
pub mod repo;
pub mod team;

pub use env_chain::{EnvChain, detect_env_chains, env_priority, infer_env};
pub use named::{NamedPattern, detect_named_pattern};
pub use org::{
    HubMapBuilder, HubSlot, SuggestedHub, SuggestedOrg, SuggestedSpace, infer_org_owner,
    synthesize_org,
};
pub use repo::{
    PatternType, RepoPattern, RepoPatternBuilder, build_repo_patterns, classify_repo,
    parse_repo_url,
};
pub use team::{TeamPattern, detect_team_patterns, team_for_namespace};

use crate::config::PatternConfig;
use crate::models::{Deployer, GitSource, ResourceRecord};
use serde::{Deserialize, Serialize};

/// Everything the `suggest` command reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternReport {
    pub repos: Vec<RepoPattern>,
    pub env_chains: Vec<EnvChain>,
    pub teams: Vec<TeamPattern>,
    pub organization: SuggestedOrg,
}

/// Run every detector and synthesize the suggested organization
pub fn analyze(
    records: &[ResourceRecord],
    sources: &[GitSource],
    deployers: &[Deployer],
    config: &PatternConfig,
) -> PatternReport {
    let repos = build_repo_patterns(sources, deployers, config);
    let env_chains = detect_env_chains(records, config.min_chain_namespaces);
    let teams = detect_team_patterns(records, &config.team_prefix);
    let organization = synthesize_org(&repos, &teams, &env_chains, config);

    tracing::debug!(
        "Pattern analysis: {} repos, {} chains, {} teams, {} hubs",
        repos.len(),
        env_chains.len(),
        teams.len(),
        organization.hubs.len()
    );

    PatternReport {
        repos,
        env_chains,
        teams,
        organization,
    }
}
