//! Inventory normalization
//!
//! Turns raw objects (listed from the API or read from a file) into the
//! inputs of the inference core: normalized records, Git sources and GitOps
//! deployers.

use crate::models::{
    Deployer, GitSource, RecordError, ResourceRecord, extract_deployers, extract_git_sources,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Normalized scan result
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub cluster: String,
    pub records: Vec<ResourceRecord>,
    pub sources: Vec<GitSource>,
    pub deployers: Vec<Deployer>,
}

impl Inventory {
    /// Normalize raw objects
    ///
    /// Fails on the first genuinely malformed object rather than returning a
    /// partial inventory.
    pub fn from_objects(cluster: &str, objects: &[Value]) -> Result<Self, RecordError> {
        let records = objects
            .iter()
            .map(|obj| ResourceRecord::from_value(cluster, obj))
            .collect::<Result<Vec<_>, _>>()?;
        let sources = extract_git_sources(objects);
        let deployers = extract_deployers(objects);

        tracing::debug!(
            "Inventory: {} records, {} git sources, {} deployers",
            records.len(),
            sources.len(),
            deployers.len()
        );

        Ok(Self {
            cluster: cluster.to_string(),
            records,
            sources,
            deployers,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Flatten a document into objects
///
/// Accepts a `kind: List` (as printed by `kubectl get -o json|yaml`), a bare
/// array or a single object. Null documents are skipped.
fn flatten_document(doc: Value, objects: &mut Vec<Value>) {
    match doc {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                flatten_document(item, objects);
            }
        }
        Value::Object(mut map) => {
            let is_list = map
                .get("kind")
                .and_then(|k| k.as_str())
                .is_some_and(|k| k == "List" || k.ends_with("List"));
            match map.remove("items") {
                Some(items) if is_list => flatten_document(items, objects),
                Some(items) => {
                    map.insert("items".to_string(), items);
                    objects.push(Value::Object(map));
                }
                None => objects.push(Value::Object(map)),
            }
        }
        other => objects.push(other),
    }
}

/// Parse objects from JSON or (multi-document) YAML text
pub fn parse_objects(contents: &str) -> Result<Vec<Value>> {
    let mut objects = Vec::new();
    let trimmed = contents.trim_start();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let doc: Value = serde_json::from_str(contents).context("Failed to parse JSON")?;
        flatten_document(doc, &mut objects);
        return Ok(objects);
    }

    for document in serde_yaml::Deserializer::from_str(contents) {
        let doc = Value::deserialize(document).context("Failed to parse YAML document")?;
        flatten_document(doc, &mut objects);
    }
    Ok(objects)
}

/// Read objects from a file exported with `kubectl get -o json|yaml`
pub fn read_objects_file(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read objects file: {}", path.display()))?;
    parse_objects(&contents).with_context(|| format!("Invalid objects file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_json_list() {
        let contents = json!({
            "apiVersion": "v1",
            "kind": "List",
            "items": [
                {"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "a", "namespace": "web"}},
                {"apiVersion": "v1", "kind": "Secret", "metadata": {"name": "b", "namespace": "web"}}
            ]
        })
        .to_string();
        let objects = parse_objects(&contents).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1]["kind"], "Secret");
    }

    #[test]
    fn test_parse_multi_document_yaml() {
        let contents = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: a
  namespace: web
---
---
apiVersion: v1
kind: PodList
items:
  - apiVersion: v1
    kind: Pod
    metadata:
      name: api-0
      namespace: web
"#;
        let objects = parse_objects(contents).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1]["metadata"]["name"], "api-0");
    }

    #[test]
    fn test_from_objects_collects_gitops_inputs() {
        let objects = vec![
            json!({
                "apiVersion": "source.toolkit.fluxcd.io/v1",
                "kind": "GitRepository",
                "metadata": {"name": "apps", "namespace": "flux-system"},
                "spec": {"url": "https://github.com/acme/apps"}
            }),
            json!({
                "apiVersion": "kustomize.toolkit.fluxcd.io/v1",
                "kind": "Kustomization",
                "metadata": {"name": "web", "namespace": "flux-system"},
                "spec": {"path": "./web", "sourceRef": {"kind": "GitRepository", "name": "apps"}}
            }),
        ];
        let inventory = Inventory::from_objects("kind", &objects).unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.sources.len(), 1);
        assert_eq!(inventory.deployers.len(), 1);
    }

    #[test]
    fn test_from_objects_rejects_malformed() {
        let objects = vec![json!({"metadata": {"name": "nameless-kind"}})];
        assert!(matches!(
            Inventory::from_objects("kind", &objects),
            Err(RecordError::MissingKind)
        ));
    }

    #[test]
    fn test_read_objects_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n  namespace: prod"
        )
        .unwrap();
        let objects = read_objects_file(file.path()).unwrap();
        assert_eq!(objects.len(), 1);
        assert!(read_objects_file(Path::new("/nonexistent/objects.yaml")).is_err());
    }
}
