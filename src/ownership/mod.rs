//! Ownership resolution
//!
//! Classifies a resource by the controller that manages it, using only its
//! labels and annotations. Rules are evaluated in order and the first match
//! wins. ConfigHub comes first: once ConfigHub manages a resource it re-emits
//! the labels of the GitOps tool it replaced.
//!
//! A resource with no evidence is `Native`. Nothing here fails.

mod tracking_id;

pub use tracking_id::{TrackedApp, parse_tracking_id};

use crate::config::schema::OwnershipConfig;
use crate::models::{OwnerType, Ownership, ResourceRecord};
use std::collections::BTreeMap;

pub const CONFIGHUB_UNIT_SLUG: &str = "confighub.com/UnitSlug";
pub const FLUX_KUSTOMIZE_NAME: &str = "kustomize.toolkit.fluxcd.io/name";
pub const FLUX_KUSTOMIZE_NAMESPACE: &str = "kustomize.toolkit.fluxcd.io/namespace";
pub const FLUX_HELM_NAME: &str = "helm.toolkit.fluxcd.io/name";
pub const FLUX_HELM_NAMESPACE: &str = "helm.toolkit.fluxcd.io/namespace";
pub const ARGOCD_INSTANCE: &str = "argocd.argoproj.io/instance";
pub const ARGOCD_TRACKING_ID: &str = "argocd.argoproj.io/tracking-id";
pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const HELM_RELEASE_NAME: &str = "meta.helm.sh/release-name";
pub const HELM_RELEASE_NAMESPACE: &str = "meta.helm.sh/release-namespace";
pub const CROSSPLANE_COMPOSITE: &str = "crossplane.io/composite";
pub const CROSSPLANE_CLAIM_NAME: &str = "crossplane.io/claim-name";
pub const CROSSPLANE_CLAIM_NAMESPACE: &str = "crossplane.io/claim-namespace";

/// Labels and annotations of the resource being classified
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    pub labels: &'a BTreeMap<String, String>,
    pub annotations: &'a BTreeMap<String, String>,
}

impl<'a> Evidence<'a> {
    pub fn new(
        labels: &'a BTreeMap<String, String>,
        annotations: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            labels,
            annotations,
        }
    }

    pub fn from_record(record: &'a ResourceRecord) -> Self {
        Self::new(&record.labels, &record.annotations)
    }

    fn label(&self, key: &str) -> Option<&'a str> {
        self.labels.get(key).map(String::as_str)
    }

    fn annotation(&self, key: &str) -> Option<&'a str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// One precedence level: a predicate and the classification it produces
pub struct OwnershipRule {
    pub name: &'static str,
    pub matches: fn(&Evidence<'_>) -> bool,
    pub classify: fn(&Evidence<'_>, &OwnershipConfig) -> Ownership,
}

/// Rules in precedence order
pub const RULES: &[OwnershipRule] = &[
    OwnershipRule {
        name: "confighub-unit",
        matches: |e| e.label(CONFIGHUB_UNIT_SLUG).is_some() || e.annotation(CONFIGHUB_UNIT_SLUG).is_some(),
        classify: classify_confighub,
    },
    OwnershipRule {
        name: "flux-kustomization",
        matches: |e| e.label(FLUX_KUSTOMIZE_NAME).is_some(),
        classify: |e, config| {
            flux_owner(e, config, FLUX_KUSTOMIZE_NAME, FLUX_KUSTOMIZE_NAMESPACE, "kustomization")
        },
    },
    OwnershipRule {
        name: "flux-helmrelease",
        matches: |e| e.label(FLUX_HELM_NAME).is_some(),
        classify: |e, config| flux_owner(e, config, FLUX_HELM_NAME, FLUX_HELM_NAMESPACE, "helmrelease"),
    },
    OwnershipRule {
        name: "argocd-instance",
        matches: |e| e.label(ARGOCD_INSTANCE).is_some(),
        classify: |e, config| {
            Ownership::new(OwnerType::ArgoCd)
                .with_sub_type("application")
                .with_name(e.label(ARGOCD_INSTANCE).unwrap_or_default())
                .with_namespace(config.argocd_namespace.as_str())
        },
    },
    OwnershipRule {
        name: "argocd-tracking-id",
        matches: |e| e.annotation(ARGOCD_TRACKING_ID).is_some(),
        classify: classify_tracking_id,
    },
    OwnershipRule {
        name: "helm",
        matches: |e| e.label(MANAGED_BY) == Some("Helm"),
        classify: |e, _| {
            Ownership::new(OwnerType::Helm)
                .with_sub_type("release")
                .with_name(e.annotation(HELM_RELEASE_NAME).unwrap_or_default())
                .with_namespace(e.annotation(HELM_RELEASE_NAMESPACE).unwrap_or_default())
        },
    },
    OwnershipRule {
        name: "crossplane",
        matches: |e| e.label(CROSSPLANE_COMPOSITE).is_some(),
        classify: classify_crossplane,
    },
    OwnershipRule {
        name: "terraform",
        matches: |e| {
            e.label(MANAGED_BY)
                .is_some_and(|v| v.eq_ignore_ascii_case("terraform"))
        },
        classify: |_, _| Ownership::new(OwnerType::Terraform),
    },
];

fn classify_confighub(e: &Evidence<'_>, _: &OwnershipConfig) -> Ownership {
    let slug = e
        .label(CONFIGHUB_UNIT_SLUG)
        .or_else(|| e.annotation(CONFIGHUB_UNIT_SLUG))
        .unwrap_or_default();
    Ownership::new(OwnerType::ConfigHub)
        .with_sub_type(slug)
        .with_name(slug)
}

fn flux_owner(
    e: &Evidence<'_>,
    config: &OwnershipConfig,
    name_label: &str,
    namespace_label: &str,
    sub_type: &str,
) -> Ownership {
    Ownership::new(OwnerType::Flux)
        .with_sub_type(sub_type)
        .with_name(e.label(name_label).unwrap_or_default())
        .with_namespace(
            e.label(namespace_label)
                .unwrap_or(config.flux_namespace.as_str()),
        )
}

fn classify_tracking_id(e: &Evidence<'_>, config: &OwnershipConfig) -> Ownership {
    let owner = Ownership::new(OwnerType::ArgoCd).with_sub_type("application");
    let value = e.annotation(ARGOCD_TRACKING_ID).unwrap_or_default();
    match parse_tracking_id(value, &config.argocd_namespace) {
        Some(app) => owner.with_name(app.name).with_namespace(app.namespace),
        None => {
            tracing::debug!("Unparseable Argo CD tracking id: {:?}", value);
            owner
        }
    }
}

fn classify_crossplane(e: &Evidence<'_>, _: &OwnershipConfig) -> Ownership {
    let owner = Ownership::new(OwnerType::Crossplane);
    match (
        e.label(CROSSPLANE_CLAIM_NAME),
        e.label(CROSSPLANE_CLAIM_NAMESPACE),
    ) {
        (Some(claim), Some(namespace)) => owner
            .with_sub_type("claim")
            .with_name(claim)
            .with_namespace(namespace),
        _ => owner
            .with_sub_type("composite")
            .with_name(e.label(CROSSPLANE_COMPOSITE).unwrap_or_default()),
    }
}

/// Resolves ownership with a fixed rule table
#[derive(Debug, Clone, Default)]
pub struct OwnershipResolver {
    config: OwnershipConfig,
}

impl OwnershipResolver {
    pub fn new(config: OwnershipConfig) -> Self {
        Self { config }
    }

    /// Names of the rules in precedence order
    pub fn rule_names() -> impl Iterator<Item = &'static str> {
        RULES.iter().map(|rule| rule.name)
    }

    /// Classify evidence and report which rule matched (`None` for Native)
    pub fn resolve_with_rule(&self, evidence: &Evidence<'_>) -> (Ownership, Option<&'static str>) {
        for rule in RULES {
            if (rule.matches)(evidence) {
                tracing::trace!("Ownership rule matched: {}", rule.name);
                return ((rule.classify)(evidence, &self.config), Some(rule.name));
            }
        }
        (Ownership::native(), None)
    }

    pub fn resolve_evidence(&self, evidence: &Evidence<'_>) -> Ownership {
        self.resolve_with_rule(evidence).0
    }

    pub fn resolve(&self, record: &ResourceRecord) -> Ownership {
        self.resolve_evidence(&Evidence::from_record(record))
    }

    /// Classify every record, preserving order
    pub fn resolve_all(&self, records: &[ResourceRecord]) -> Vec<Ownership> {
        records.iter().map(|record| self.resolve(record)).collect()
    }
}
