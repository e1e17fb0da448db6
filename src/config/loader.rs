//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Cluster-specific config
    /// 3. Root config
    /// 4. Built-in defaults
    pub fn load(cluster: Option<&str>) -> Result<Config> {
        let cluster_path = cluster.map(paths::cluster_config_path);
        let config = Self::load_layers(&paths::root_config_path(), cluster_path.as_deref())?;
        Ok(Self::apply_env_overrides(config))
    }

    /// Merge the root and cluster files over the built-in defaults
    ///
    /// Layers are merged as YAML mappings before deserializing, so a key a
    /// file leaves out keeps the value of the layer below. Missing files are
    /// skipped.
    pub fn load_layers(root: &Path, cluster: Option<&Path>) -> Result<Config> {
        let mut merged = serde_yaml::to_value(Self::load_defaults())
            .context("Failed to serialize default configuration")?;

        for path in std::iter::once(root).chain(cluster) {
            if path.exists() {
                let layer = Self::load_layer(path)?;
                Self::merge_config(&mut merged, layer);
            }
        }

        serde_yaml::from_value(merged).context("Failed to build merged configuration")
    }

    /// Read one config file as a raw YAML layer, checking its field types
    fn load_layer(path: &Path) -> Result<Value> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Value::Null);
        }

        let layer: Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if !layer.is_null() {
            serde_yaml::from_value::<Config>(layer.clone())
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        }

        Ok(layer)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// This performs strict validation - it will fail on:
    /// - Invalid YAML syntax
    /// - Invalid value types
    /// - Thresholds that make pattern detection meaningless
    pub fn validate(cluster: Option<&str>) -> Result<()> {
        let config = Self::load(cluster).context("Failed to load merged configuration")?;

        if config.patterns.min_chain_namespaces < 2 {
            return Err(anyhow::anyhow!(
                "patterns.minChainNamespaces must be at least 2, got {}",
                config.patterns.min_chain_namespaces
            ));
        }
        if config.patterns.team_prefix.is_empty() {
            return Err(anyhow::anyhow!("patterns.teamPrefix cannot be empty"));
        }
        if config.cluster.contains('/') {
            return Err(anyhow::anyhow!(
                "cluster name '{}' cannot contain '/'",
                config.cluster
            ));
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Deep-merge `other` into `base`, with `other` taking precedence
    ///
    /// Mappings merge key by key. Any other value replaces the base value,
    /// except `null`, which leaves it untouched.
    fn merge_config(base: &mut Value, other: Value) {
        match (base, other) {
            (_, Value::Null) => {}
            (Value::Mapping(base_map), Value::Mapping(other_map)) => {
                for (key, value) in other_map {
                    match base_map.get_mut(&key) {
                        Some(existing) => Self::merge_config(existing, value),
                        None => {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
            (base, other) => *base = other,
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        // GITOPS_SCOUT_CLUSTER override
        if let Ok(cluster) = std::env::var("GITOPS_SCOUT_CLUSTER") {
            if !cluster.is_empty() {
                config.cluster = cluster;
            }
        }

        // GITOPS_SCOUT_OUTPUT override
        if let Ok(output) = std::env::var("GITOPS_SCOUT_OUTPUT") {
            match output.parse() {
                Ok(format) => config.output = format,
                Err(e) => tracing::warn!("Ignoring GITOPS_SCOUT_OUTPUT: {}", e),
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }

    /// Save cluster-specific configuration
    pub fn save_cluster(config: &Config, cluster: &str) -> Result<()> {
        Self::save(config, &paths::cluster_config_path(cluster))
    }
}
