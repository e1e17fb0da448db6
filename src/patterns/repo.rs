//! Repository pattern classification
//!
//! Folds every deployer that references a Git repository into one
//! `RepoPattern`, then classifies the repository once accumulation is done.

use super::named::{NamedPattern, detect_named_pattern};
use crate::config::PatternConfig;
use crate::models::{Deployer, GitOpsTool, GitSource, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Repository category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// No deployer uses the repository
    #[default]
    Unused,
    /// Shared platform/infrastructure repository
    Platform,
    /// Upstream repository maintained outside the organization
    External,
    /// Many apps or paths in one repository
    Monorepo,
    /// One app per repository
    Polyrepo,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Unused => "unused",
            PatternType::Platform => "platform",
            PatternType::External => "external",
            PatternType::Monorepo => "monorepo",
            PatternType::Polyrepo => "polyrepo",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One inferred Git source repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoPattern {
    pub url: String,
    pub owner: String,
    pub name: String,
    pub paths: BTreeSet<String>,
    pub apps: BTreeSet<String>,
    pub tool: GitOpsTool,
    pub pattern_type: PatternType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_pattern: Option<NamedPattern>,
}

impl RepoPattern {
    fn new(url: &str, tool: GitOpsTool) -> Self {
        let (owner, name) = parse_repo_url(url);
        Self {
            url: url.to_string(),
            owner,
            name,
            paths: BTreeSet::new(),
            apps: BTreeSet::new(),
            tool,
            pattern_type: PatternType::Unused,
            named_pattern: None,
        }
    }
}

/// Split a Git URL into `(owner, name)`
///
/// Handles `https://host/owner/name(.git)`, `ssh://git@host/owner/name.git`
/// and scp-like `git@host:owner/name.git`. For nested groups the owner is
/// the top-level group. Unparseable URLs yield an empty owner.
pub fn parse_repo_url(url: &str) -> (String, String) {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let path = if !trimmed.contains("://") {
        // scp-like `user@host:path`
        match trimmed.split_once(':') {
            Some((_, path)) => path.to_string(),
            None => trimmed.to_string(),
        }
    } else {
        match url::Url::parse(trimmed) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => {
                let name = trimmed.rsplit('/').next().unwrap_or("").to_string();
                return (String::new(), name);
            }
        }
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => (String::new(), String::new()),
        [name] => (String::new(), name.to_string()),
        [owner, .., name] => (owner.to_string(), name.to_string()),
    }
}

/// Key under which two spellings of the same repository merge
fn normalize_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix(".git")
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// Deployment path as accumulated (`./apps/prod/` -> `apps/prod`)
fn normalize_path(path: &str) -> Option<String> {
    let cleaned = path.trim().trim_start_matches("./").trim_matches('/');
    if cleaned.is_empty() || cleaned == "." {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Classify a fully accumulated repository
///
/// Rules in order: no apps, platform name, external owner, size threshold,
/// otherwise polyrepo.
pub fn classify_repo(repo: &RepoPattern, config: &PatternConfig) -> PatternType {
    if repo.apps.is_empty() {
        return PatternType::Unused;
    }

    let name = repo.name.to_lowercase();
    if config
        .platform_keywords
        .iter()
        .any(|keyword| name.contains(&keyword.to_lowercase()))
    {
        return PatternType::Platform;
    }

    let owner = repo.owner.to_lowercase();
    if !owner.is_empty()
        && config
            .external_owners
            .iter()
            .any(|external| owner.contains(&external.to_lowercase()))
    {
        return PatternType::External;
    }

    if repo.apps.len() > config.monorepo_threshold || repo.paths.len() > config.monorepo_threshold
    {
        return PatternType::Monorepo;
    }

    PatternType::Polyrepo
}

/// Accumulates repositories keyed by normalized URL, in first-seen order
#[derive(Debug, Default)]
pub struct RepoPatternBuilder {
    repos: Vec<RepoPattern>,
    index: HashMap<String, usize>,
}

impl RepoPatternBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the repository for `url`, registering it on first sight
    ///
    /// An existing repository seen through another tool has its tool merged.
    pub fn insert_or_get(&mut self, url: &str, tool: GitOpsTool) -> &mut RepoPattern {
        let key = normalize_url(url);
        let idx = match self.index.get(&key) {
            Some(&idx) => {
                let repo = &mut self.repos[idx];
                repo.tool = repo.tool.merge(tool);
                idx
            }
            None => {
                self.repos.push(RepoPattern::new(url, tool));
                self.index.insert(key, self.repos.len() - 1);
                self.repos.len() - 1
            }
        };
        &mut self.repos[idx]
    }

    /// Fold one deployer into its repository
    pub fn add_deployment(&mut self, url: &str, tool: GitOpsTool, app: &str, path: &str) {
        let repo = self.insert_or_get(url, tool);
        if !app.is_empty() {
            repo.apps.insert(app.to_string());
        }
        if let Some(path) = normalize_path(path) {
            repo.paths.insert(path);
        }
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Classify every repository and return them in first-seen order
    pub fn finish(self, config: &PatternConfig) -> Vec<RepoPattern> {
        self.repos
            .into_iter()
            .map(|mut repo| {
                repo.pattern_type = classify_repo(&repo, config);
                repo.named_pattern = detect_named_pattern(repo.paths.iter().map(String::as_str));
                tracing::debug!(
                    "Repo {} classified as {} ({} apps, {} paths)",
                    repo.url,
                    repo.pattern_type,
                    repo.apps.len(),
                    repo.paths.len()
                );
                repo
            })
            .collect()
    }
}

/// Build repository patterns from Git sources and the deployers using them
///
/// Flux sources are registered first so unreferenced repositories show up as
/// `unused`. Deployers whose source cannot be resolved are skipped.
pub fn build_repo_patterns(
    sources: &[GitSource],
    deployers: &[Deployer],
    config: &PatternConfig,
) -> Vec<RepoPattern> {
    let mut builder = RepoPatternBuilder::new();
    let mut source_urls: HashMap<(&str, &str), &str> = HashMap::new();

    for source in sources {
        builder.insert_or_get(&source.url, GitOpsTool::Flux);
        source_urls.insert(
            (source.namespace.as_str(), source.name.as_str()),
            source.url.as_str(),
        );
    }

    for deployer in deployers {
        let url = match (&deployer.repo_url, &deployer.source_ref) {
            (Some(url), _) => Some(url.as_str()),
            (None, Some(source_ref)) if source_ref.kind == ResourceKind::GitRepository.as_str() => {
                source_urls
                    .get(&(source_ref.namespace.as_str(), source_ref.name.as_str()))
                    .copied()
            }
            _ => None,
        };

        match url {
            Some(url) => builder.add_deployment(url, deployer.tool, &deployer.name, &deployer.path),
            None => tracing::debug!(
                "Skipping {} {}/{}: source not resolvable to a Git URL",
                deployer.kind,
                deployer.namespace,
                deployer.name
            ),
        }
    }

    builder.finish(config)
}
