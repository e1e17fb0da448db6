//! Organization synthesis tests
//!
//! Hub construction from platform repos, teams and environment chains, and
//! the end-to-end `analyze` pipeline.

use gitops_scout::config::PatternConfig;
use gitops_scout::models::{
    GitOpsTool, ResourceRecord, extract_deployers, extract_git_sources,
};
use gitops_scout::patterns::{
    EnvChain, PatternType, RepoPattern, TeamPattern, analyze, synthesize_org,
};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn platform_repo() -> RepoPattern {
    RepoPattern {
        url: "https://github.com/acme/platform".to_string(),
        owner: "acme".to_string(),
        name: "platform".to_string(),
        paths: set(&["infra/ingress", "infra/monitoring"]),
        apps: set(&["ingress", "monitoring"]),
        tool: GitOpsTool::Flux,
        pattern_type: PatternType::Platform,
        named_pattern: None,
    }
}

fn payments_team() -> TeamPattern {
    TeamPattern {
        name: "payments".to_string(),
        namespaces: set(&["team-payments"]),
        workloads: 4,
    }
}

fn chain(app: &str, namespaces: &[&str]) -> EnvChain {
    EnvChain {
        app_name: app.to_string(),
        environments: namespaces
            .iter()
            .map(|ns| (ns.to_string(), format!("{}:1.0", app)))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn test_three_hubs_sorted() {
    let org = synthesize_org(
        &[platform_repo()],
        &[payments_team()],
        &[chain("checkout", &["dev", "staging", "prod"])],
        &PatternConfig::default(),
    );

    let names: Vec<&str> = org.hubs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["checkout", "payments", "platform"]);
    assert_eq!(org.organization, "acme");
}

#[test]
fn test_platform_hub_spaces_are_shared() {
    let org = synthesize_org(&[platform_repo()], &[], &[], &PatternConfig::default());

    let hub = org.hub("platform").unwrap();
    assert_eq!(hub.app_spaces.len(), 2);
    assert!(hub.app_spaces.iter().all(|s| s.env == "shared"));
    assert_eq!(hub.app_spaces[0].workloads, vec!["ingress".to_string()]);
}

#[test]
fn test_team_hub_spaces() {
    let org = synthesize_org(&[], &[payments_team()], &[], &PatternConfig::default());

    let hub = org.hub("payments").unwrap();
    assert_eq!(hub.app_spaces.len(), 1);
    assert_eq!(hub.app_spaces[0].name, "team-payments");
    assert_eq!(hub.app_spaces[0].env, "default");
    assert_eq!(hub.app_spaces[0].workload_count, Some(4));
}

#[test]
fn test_chain_hub_spaces_in_promotion_order() {
    let org = synthesize_org(
        &[],
        &[],
        &[chain("checkout", &["shop-prod", "shop-dev", "shop-staging"])],
        &PatternConfig::default(),
    );

    let hub = org.hub("checkout").unwrap();
    let spaces: Vec<&str> = hub.app_spaces.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        spaces,
        vec!["checkout-dev", "checkout-staging", "checkout-prod"]
    );
}

#[test]
fn test_regional_prod_namespaces_each_get_a_space() {
    let org = synthesize_org(
        &[],
        &[],
        &[chain("web", &["dev", "prod-eu", "prod-us", "sandbox-a", "sandbox-b"])],
        &PatternConfig::default(),
    );

    let hub = org.hub("web").unwrap();
    assert_eq!(hub.app_spaces.len(), 5);
    let spaces: Vec<&str> = hub.app_spaces.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        spaces,
        vec![
            "web-dev",
            "web-prod",
            "web-prod-prod-us",
            "web-default",
            "web-default-sandbox-b"
        ]
    );
}

#[test]
fn test_two_environment_chain_gets_no_hub() {
    let org = synthesize_org(
        &[],
        &[],
        &[chain("cart", &["dev", "prod"])],
        &PatternConfig::default(),
    );
    assert!(org.hubs.is_empty());
}

#[test]
fn test_earlier_hub_is_not_replaced() {
    let team = TeamPattern {
        name: "platform".to_string(),
        namespaces: set(&["team-platform"]),
        workloads: 2,
    };
    let org = synthesize_org(
        &[platform_repo()],
        &[team],
        &[],
        &PatternConfig::default(),
    );

    assert_eq!(org.hubs.len(), 1);
    let hub = org.hub("platform").unwrap();
    assert!(hub.app_spaces.iter().all(|s| s.env == "shared"));
}

#[test]
fn test_external_repos_do_not_name_the_organization() {
    let mut upstream = platform_repo();
    upstream.owner = "fluxcd".to_string();
    upstream.pattern_type = PatternType::External;

    let org = synthesize_org(&[upstream], &[], &[], &PatternConfig::default());
    assert_eq!(org.organization, "");
}

#[test]
fn test_analyze_end_to_end() {
    let mut objects = vec![json!({
        "apiVersion": "source.toolkit.fluxcd.io/v1",
        "kind": "GitRepository",
        "metadata": {"name": "infra", "namespace": "flux-system"},
        "spec": {"url": "git@github.com:acme/infrastructure.git"}
    })];
    for app in ["ingress", "cert-manager"] {
        objects.push(json!({
            "apiVersion": "kustomize.toolkit.fluxcd.io/v1",
            "kind": "Kustomization",
            "metadata": {"name": app, "namespace": "flux-system"},
            "spec": {"path": format!("./{}", app), "sourceRef": {"kind": "GitRepository", "name": "infra"}}
        }));
    }
    for ns in ["dev", "staging", "prod"] {
        objects.push(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "checkout", "namespace": ns},
            "spec": {"template": {"spec": {"containers": [{"name": "checkout", "image": "shop/checkout:1"}]}}}
        }));
    }
    objects.push(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "ledger", "namespace": "team-payments"}
    }));

    let records: Vec<ResourceRecord> = objects
        .iter()
        .map(|obj| ResourceRecord::from_value("prod", obj).unwrap())
        .collect();
    let report = analyze(
        &records,
        &extract_git_sources(&objects),
        &extract_deployers(&objects),
        &PatternConfig::default(),
    );

    assert_eq!(report.repos.len(), 1);
    assert_eq!(report.repos[0].pattern_type, PatternType::Platform);
    assert_eq!(report.env_chains.len(), 1);
    assert_eq!(report.teams.len(), 1);

    let names: Vec<&str> = report
        .organization
        .hubs
        .iter()
        .map(|h| h.name.as_str())
        .collect();
    assert_eq!(names, vec!["checkout", "payments", "platform"]);
    assert_eq!(report.organization.organization, "acme");
}
