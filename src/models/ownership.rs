//! Ownership classification types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The controller or tool responsible for a resource's lifecycle
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum OwnerType {
    Flux,
    #[serde(rename = "ArgoCD")]
    ArgoCd,
    Helm,
    Terraform,
    Crossplane,
    ConfigHub,
    /// No controller evidence found
    #[default]
    Native,
}

impl OwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::Flux => "Flux",
            OwnerType::ArgoCd => "ArgoCD",
            OwnerType::Helm => "Helm",
            OwnerType::Terraform => "Terraform",
            OwnerType::Crossplane => "Crossplane",
            OwnerType::ConfigHub => "ConfigHub",
            OwnerType::Native => "Native",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            OwnerType::Flux,
            OwnerType::ArgoCd,
            OwnerType::Helm,
            OwnerType::Terraform,
            OwnerType::Crossplane,
            OwnerType::ConfigHub,
            OwnerType::Native,
        ]
    }

    /// Managed by anything other than a bare `kubectl apply`
    pub fn is_managed(&self) -> bool {
        !matches!(self, OwnerType::Native)
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OwnerType::all()
            .iter()
            .copied()
            .find(|owner| owner.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown owner type: {}", s))
    }
}

/// Inferred owner of a resource
///
/// `name`/`namespace` identify the owning controller object (the Flux
/// Kustomization, the Argo CD Application, the Helm release), not the
/// resource that was classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    #[serde(rename = "type")]
    pub owner_type: OwnerType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sub_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl Ownership {
    pub fn native() -> Self {
        Self::default()
    }

    pub fn new(owner_type: OwnerType) -> Self {
        Self {
            owner_type,
            ..Default::default()
        }
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = sub_type.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn is_native(&self) -> bool {
        self.owner_type == OwnerType::Native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_native() {
        assert!(Ownership::default().is_native());
        assert!(!OwnerType::Native.is_managed());
        assert!(OwnerType::Helm.is_managed());
    }

    #[test]
    fn test_owner_type_parse() {
        assert_eq!("argocd".parse::<OwnerType>(), Ok(OwnerType::ArgoCd));
        assert_eq!("ConfigHub".parse::<OwnerType>(), Ok(OwnerType::ConfigHub));
        assert!("kubectl".parse::<OwnerType>().is_err());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let owner = Ownership::new(OwnerType::ArgoCd).with_name("guestbook");
        let value = serde_json::to_value(&owner).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "ArgoCD", "name": "guestbook"})
        );
    }
}
