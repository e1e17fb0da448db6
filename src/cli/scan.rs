//! Scan command handlers (`snapshot`, `suggest`)

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};
use crate::kube::{self, Inventory, KubeLister};
use crate::ownership::OwnershipResolver;
use crate::patterns;
use crate::snapshot;

/// Where to read objects from
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Read objects from a `kubectl get -o json|yaml` export instead of the cluster
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Only scan this namespace
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Cluster name recorded in resource IDs
    #[arg(long)]
    pub cluster: Option<String>,
}

/// Render a value in the configured output format
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to serialize to YAML"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
        }
    }
}

/// Collect and normalize objects from a file or the current cluster
///
/// The cluster name is `--cluster`, then the kubeconfig context for live
/// scans, then the configured `cluster`.
pub async fn load_inventory(args: &ScanArgs, config: &Config) -> Result<Inventory> {
    let namespace = args.namespace.as_deref();
    let excluded = &config.scan.exclude_namespaces;

    let (cluster, objects) = match &args.file {
        Some(path) => {
            let objects = kube::read_objects_file(path)?;
            let cluster = args.cluster.clone().unwrap_or_else(|| config.cluster.clone());
            (cluster, kube::scope_objects(objects, namespace, excluded))
        }
        None => {
            let client = kube::create_client().await?;
            let cluster = args
                .cluster
                .clone()
                .or_else(kube::get_context)
                .unwrap_or_else(|| config.cluster.clone());
            tracing::debug!("Scanning cluster {}", cluster);
            let lister = KubeLister::new(client);
            (cluster, kube::collect(&lister, namespace, excluded).await)
        }
    };

    Inventory::from_objects(&cluster, &objects).context("Failed to normalize objects")
}

/// Print the GSF snapshot
pub async fn handle_snapshot(args: ScanArgs, config: &Config) -> Result<()> {
    let inventory = load_inventory(&args, config).await?;
    let resolver = OwnershipResolver::new(config.ownership.clone());
    let snapshot = snapshot::build_snapshot(
        &inventory.cluster,
        &inventory.records,
        &resolver,
        chrono::Utc::now(),
    );
    println!("{}", render(&snapshot, config.output)?);
    Ok(())
}

/// Print detected patterns and the suggested organization
pub async fn handle_suggest(args: ScanArgs, config: &Config) -> Result<()> {
    let inventory = load_inventory(&args, config).await?;
    let report = patterns::analyze(
        &inventory.records,
        &inventory.sources,
        &inventory.deployers,
        &config.patterns,
    );
    println!("{}", render(&report, config.output)?);
    Ok(())
}
