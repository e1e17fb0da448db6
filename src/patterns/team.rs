//! Team detection from namespace naming
//!
//! `team-<name>` and `team-<name>-<suffix>` namespaces belong to team `<name>`.

use crate::models::ResourceRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPattern {
    pub name: String,
    pub namespaces: BTreeSet<String>,
    /// Workloads across all of the team's namespaces
    pub workloads: usize,
}

/// Team name encoded in a namespace, if it follows the convention
pub fn team_for_namespace<'a>(namespace: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = namespace.strip_prefix(prefix)?;
    let team = rest.split('-').next().unwrap_or("");
    (!team.is_empty()).then_some(team)
}

/// Group namespaces into teams by naming convention
///
/// Namespaces come from namespaced records and from `Namespace` objects.
pub fn detect_team_patterns(records: &[ResourceRecord], prefix: &str) -> Vec<TeamPattern> {
    if prefix.is_empty() {
        return Vec::new();
    }

    let mut teams: BTreeMap<&str, TeamPattern> = BTreeMap::new();
    for record in records {
        let namespace = if record.kind == "Namespace" {
            record.name.as_str()
        } else {
            record.namespace.as_str()
        };
        let Some(team) = team_for_namespace(namespace, prefix) else {
            continue;
        };

        let pattern = teams.entry(team).or_insert_with(|| TeamPattern {
            name: team.to_string(),
            namespaces: BTreeSet::new(),
            workloads: 0,
        });
        pattern.namespaces.insert(namespace.to_string());
        if record.resource_kind().is_some_and(|k| k.is_workload()) {
            pattern.workloads += 1;
        }
    }

    tracing::debug!("Detected {} teams", teams.len());
    teams.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_for_namespace() {
        assert_eq!(team_for_namespace("team-payments", "team-"), Some("payments"));
        assert_eq!(team_for_namespace("team-payments-prod", "team-"), Some("payments"));
        assert_eq!(team_for_namespace("team-", "team-"), None);
        assert_eq!(team_for_namespace("payments", "team-"), None);
    }

    #[test]
    fn test_namespace_objects_count_without_workloads() {
        let records = vec![ResourceRecord::new("Namespace", "", "team-search")];
        let teams = detect_team_patterns(&records, "team-");
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "search");
        assert_eq!(teams[0].workloads, 0);
    }
}
