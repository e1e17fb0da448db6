//! Normalized resource records
//!
//! A `ResourceRecord` is the flattened view of one cluster object that the
//! inference engine works on: identity, labels, annotations, owner references,
//! and the handful of spec fields relation building needs (selector,
//! containers, volumes).
//!
//! Records are produced from raw JSON (a `DynamicObject` or a `kubectl get -o json`
//! item) by [`ResourceRecord::from_value`]. Missing fields default to empty;
//! only type-mismatched fields are rejected.

use super::kind::ResourceKind;
use super::resource_id::{ResourceId, api_group};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Errors raised while normalizing a raw object
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("object has no kind")]
    MissingKind,

    #[error("{kind} object has no metadata.name")]
    MissingName { kind: String },

    #[error("malformed {kind} {name}: {source}")]
    Malformed {
        kind: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One owner reference from `metadata.ownerReferences`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uid: String,
}

/// `envFrom` entry, reduced to the referenced object names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFromSource {
    pub config_map: Option<String>,
    pub secret: Option<String>,
}

/// `env[].valueFrom` entry, reduced to the referenced object names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub config_map: Option<String>,
    pub secret: Option<String>,
}

/// Pod volume, reduced to ConfigMap/Secret sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    pub config_map: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub image: String,
    pub env_from: Vec<EnvFromSource>,
    pub env: Vec<EnvVar>,
    pub volume_mounts: Vec<String>,
}

/// Normalized view of one cluster object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRecord {
    pub cluster: String,
    pub namespace: String,
    pub name: String,
    pub kind: String,
    pub api_version: String,
    pub uid: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub owner_references: Vec<OwnerRef>,
    /// Service `spec.selector` or workload `spec.selector.matchLabels`
    pub selector: BTreeMap<String, String>,
    /// Pod containers (init containers included), or the pod template's for workloads
    pub containers: Vec<Container>,
    pub volumes: Vec<Volume>,
    /// Set by the collection layer when drift was detected
    pub drifted: bool,
}

impl ResourceRecord {
    pub fn new(kind: &str, namespace: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn api_group(&self) -> &str {
        api_group(&self.api_version)
    }

    pub fn id(&self) -> ResourceId {
        ResourceId::new(
            &self.cluster,
            &self.namespace,
            self.api_group(),
            &self.kind,
            &self.name,
        )
    }

    pub fn resource_kind(&self) -> Option<ResourceKind> {
        ResourceKind::parse_optional(&self.kind)
    }

    pub fn is_kind(&self, kind: ResourceKind) -> bool {
        self.kind == kind.as_str()
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Image of the first container, if any
    pub fn primary_image(&self) -> Option<&str> {
        self.containers
            .first()
            .map(|c| c.image.as_str())
            .filter(|image| !image.is_empty())
    }

    /// Normalize a raw Kubernetes object
    pub fn from_value(cluster: &str, obj: &Value) -> Result<Self, RecordError> {
        let kind = obj
            .get("kind")
            .and_then(|k| k.as_str())
            .filter(|k| !k.is_empty())
            .ok_or(RecordError::MissingKind)?
            .to_string();
        let name = obj
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .ok_or_else(|| RecordError::MissingName { kind: kind.clone() })?
            .to_string();

        let malformed = |source| RecordError::Malformed {
            kind: kind.clone(),
            name: name.clone(),
            source,
        };

        let raw = RawObject::deserialize(obj).map_err(malformed)?;
        let mut record = ResourceRecord {
            cluster: cluster.to_string(),
            namespace: raw.metadata.namespace,
            name: name.clone(),
            kind: kind.clone(),
            api_version: raw.api_version,
            uid: raw.metadata.uid,
            labels: raw.metadata.labels,
            annotations: raw.metadata.annotations,
            owner_references: raw.metadata.owner_references,
            drifted: false,
            ..Default::default()
        };

        let Some(spec) = raw.spec.filter(|s| !s.is_null()) else {
            return Ok(record);
        };

        match ResourceKind::parse_optional(&kind) {
            Some(ResourceKind::Service) => {
                let spec = RawServiceSpec::deserialize(&spec).map_err(malformed)?;
                record.selector = spec.selector.unwrap_or_default();
            }
            Some(ResourceKind::Pod) => {
                let spec = RawPodSpec::deserialize(&spec).map_err(malformed)?;
                spec.apply(&mut record);
            }
            Some(k) if k.has_pod_template() => {
                let spec = RawWorkloadSpec::deserialize(&spec).map_err(malformed)?;
                if let Some(selector) = spec.selector {
                    record.selector = selector.match_labels;
                }
                if let Some(pod_spec) = spec.template.and_then(|t| t.spec) {
                    pod_spec.apply(&mut record);
                }
            }
            _ => {}
        }

        Ok(record)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    spec: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    uid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    labels: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    annotations: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    owner_references: Vec<OwnerRef>,
}

#[derive(Debug, Default, Deserialize)]
struct RawServiceSpec {
    #[serde(default)]
    selector: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorkloadSpec {
    #[serde(default)]
    selector: Option<RawLabelSelector>,
    #[serde(default)]
    template: Option<RawPodTemplate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLabelSelector {
    #[serde(default, deserialize_with = "null_as_default")]
    match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPodTemplate {
    #[serde(default)]
    spec: Option<RawPodSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPodSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    containers: Vec<RawContainer>,
    #[serde(default, deserialize_with = "null_as_default")]
    init_containers: Vec<RawContainer>,
    #[serde(default, deserialize_with = "null_as_default")]
    volumes: Vec<RawVolume>,
}

impl RawPodSpec {
    fn apply(self, record: &mut ResourceRecord) {
        record.containers = self
            .containers
            .into_iter()
            .chain(self.init_containers)
            .map(RawContainer::into_container)
            .collect();
        record.volumes = self
            .volumes
            .into_iter()
            .map(|v| Volume {
                name: v.name,
                config_map: v.config_map.and_then(|c| c.name),
                secret: v.secret.and_then(|s| s.secret_name),
            })
            .collect();
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContainer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    env_from: Vec<RawEnvFrom>,
    #[serde(default, deserialize_with = "null_as_default")]
    env: Vec<RawEnvVar>,
    #[serde(default, deserialize_with = "null_as_default")]
    volume_mounts: Vec<RawVolumeMount>,
}

impl RawContainer {
    fn into_container(self) -> Container {
        Container {
            name: self.name,
            image: self.image,
            env_from: self
                .env_from
                .into_iter()
                .map(|e| EnvFromSource {
                    config_map: e.config_map_ref.and_then(|r| r.name),
                    secret: e.secret_ref.and_then(|r| r.name),
                })
                .collect(),
            env: self
                .env
                .into_iter()
                .map(|e| {
                    let value_from = e.value_from.unwrap_or_default();
                    EnvVar {
                        name: e.name,
                        config_map: value_from.config_map_key_ref.and_then(|r| r.name),
                        secret: value_from.secret_key_ref.and_then(|r| r.name),
                    }
                })
                .collect(),
            volume_mounts: self.volume_mounts.into_iter().map(|m| m.name).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvFrom {
    #[serde(default)]
    config_map_ref: Option<RawNameRef>,
    #[serde(default)]
    secret_ref: Option<RawNameRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvVar {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value_from: Option<RawValueFrom>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValueFrom {
    #[serde(default)]
    config_map_key_ref: Option<RawNameRef>,
    #[serde(default)]
    secret_key_ref: Option<RawNameRef>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNameRef {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVolume {
    #[serde(default)]
    name: String,
    #[serde(default)]
    config_map: Option<RawNameRef>,
    #[serde(default)]
    secret: Option<RawSecretVolume>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSecretVolume {
    #[serde(default)]
    secret_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVolumeMount {
    #[serde(default)]
    name: String,
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
