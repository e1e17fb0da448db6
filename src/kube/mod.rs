//! Kubernetes client module
//!
//! Connection setup plus the collection layer that feeds the inference core:
//! - `fetch.rs` - Listing scan targets through the API
//! - `inventory.rs` - Normalizing raw objects (from the API or a file)
//!
//! Proxy settings come from the standard `HTTP_PROXY` / `HTTPS_PROXY` /
//! `NO_PROXY` variables. Internal API server hosts bypass the proxy even when
//! `NO_PROXY` does not list them.

pub mod fetch;
pub mod inventory;

pub use fetch::{KubeLister, ObjectLister, collect, scope_objects};
pub use inventory::{Inventory, read_objects_file};

use anyhow::{Context, Result};
use kube::{Client, Config};
use url::Url;

/// Initialize a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let mut config = Config::infer()
        .await
        .context("Failed to infer Kubernetes config")?;

    if let Some(host) = Url::parse(&config.cluster_url.to_string())
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    {
        let no_proxy = std::env::var("NO_PROXY")
            .or_else(|_| std::env::var("no_proxy"))
            .unwrap_or_default();
        if config.proxy_url.is_some()
            && is_internal_host(&host)
            && !no_proxy_contains(&no_proxy, &host)
        {
            tracing::debug!("Bypassing proxy for internal API server {}", host);
            config.proxy_url = None;
        }
    }

    Client::try_from(config).context("Failed to create Kubernetes client")
}

/// Name of the current kubeconfig context, used as the cluster name
pub fn get_context() -> Option<String> {
    kube::config::Kubeconfig::read()
        .ok()
        .and_then(|kubeconfig| kubeconfig.current_context)
        .filter(|context| !context.is_empty())
}

/// Private addresses, localhost and internal-looking domains
fn is_internal_host(host: &str) -> bool {
    if host == "localhost"
        || host == "::1"
        || host.starts_with("127.")
        || host.starts_with("10.")
        || host.starts_with("192.168.")
        || is_private_172(host)
    {
        return true;
    }

    if [".local", ".internal", ".cluster.local"]
        .iter()
        .any(|suffix| host.ends_with(suffix))
    {
        return true;
    }

    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() < 2 {
        return false;
    }
    // Any label except the TLD
    let labels = &parts[..parts.len() - 1];
    if labels
        .iter()
        .any(|label| matches!(*label, "corp" | "internal" | "int" | "local"))
    {
        return true;
    }
    labels.iter().any(|label| {
        ["dev", "test", "staging", "qa", "uat", "internal"]
            .iter()
            .any(|prefix| label.starts_with(prefix))
    })
}

fn is_private_172(host: &str) -> bool {
    let mut octets = host.split('.');
    octets.next() == Some("172")
        && octets
            .next()
            .and_then(|o| o.parse::<u8>().ok())
            .is_some_and(|o| (16..=31).contains(&o))
}

/// Whether a NO_PROXY list already covers the host
///
/// `example.com` and `.example.com` both cover the domain and its subdomains.
fn no_proxy_contains(no_proxy: &str, host: &str) -> bool {
    no_proxy
        .split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| {
            let domain = pattern.strip_prefix('.').unwrap_or(pattern);
            pattern == "*" || host == domain || host.ends_with(&format!(".{}", domain))
        })
}
