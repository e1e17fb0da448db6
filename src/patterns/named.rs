//! Named repository architectures
//!
//! Recognizes well-known layouts for organizing environment overlays from the
//! set of paths deployed out of a repository. Detection only looks at path
//! substrings and is independent of the repo's pattern type.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedPattern {
    /// Shared `components/` with `base/` layers composed per target
    ControlPlane,
    /// One directory per cluster under `clusters/`
    ClusterPerDirectory,
    /// `base/` plus one overlay folder per environment
    EnvironmentPerFolder,
}

impl NamedPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamedPattern::ControlPlane => "control-plane",
            NamedPattern::ClusterPerDirectory => "cluster-per-directory",
            NamedPattern::EnvironmentPerFolder => "environment-per-folder",
        }
    }
}

impl fmt::Display for NamedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Default)]
struct Markers {
    envs: bool,
    base: bool,
    clusters: bool,
    components: bool,
    overlays: bool,
}

/// Detect the named architecture of a repository from its paths
///
/// Precedence: components+base, then clusters, then base+(overlays or envs),
/// then envs alone. A repo with components, base and clusters is a
/// control-plane layout.
pub fn detect_named_pattern<'a, I>(paths: I) -> Option<NamedPattern>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut markers = Markers::default();
    for path in paths {
        // Anchor both ends so `clusters/prod` and `./apps/base` match like `/clusters/`, `/base`
        let anchored = format!("/{}/", path.trim_start_matches("./").trim_matches('/'));
        markers.envs |= anchored.contains("/envs/") || anchored.contains("/environments/");
        markers.base |= anchored.contains("/base");
        markers.clusters |= anchored.contains("/clusters/");
        markers.components |= anchored.contains("/components/");
        markers.overlays |= anchored.contains("/overlays/");
    }

    if markers.components && markers.base {
        Some(NamedPattern::ControlPlane)
    } else if markers.clusters {
        Some(NamedPattern::ClusterPerDirectory)
    } else if markers.base && (markers.overlays || markers.envs) {
        Some(NamedPattern::EnvironmentPerFolder)
    } else if markers.envs {
        Some(NamedPattern::EnvironmentPerFolder)
    } else {
        None
    }
}
