//! gitops-scout - inventory a Kubernetes cluster and infer its GitOps organization
//!
//! Reads resources from the current cluster (or an exported file), works out
//! who manages each one and how they relate, and prints a GSF snapshot or a
//! suggested organization.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitops_scout::cli::{self, ConfigSubcommand, ScanArgs};
use gitops_scout::config::{ConfigLoader, OutputFormat};

/// Inventory Kubernetes workloads and infer how they are managed
#[derive(Parser, Debug)]
#[command(name = "gitops-scout")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Output format (overrides configuration)
    #[arg(long, short = 'o', global = true)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print a snapshot of resources, owners and relations
    Snapshot {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Detect repository, environment and team patterns and suggest an organization
    Suggest {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    cli::init_logging(args.debug);

    match args.command {
        Command::Config { subcommand } => cli::handle_config_command(subcommand),
        Command::Version => {
            cli::display_version();
            Ok(())
        }
        Command::Snapshot { scan } => {
            let mut config = ConfigLoader::load(scan.cluster.as_deref())
                .context("Failed to load configuration")?;
            if let Some(output) = args.output {
                config.output = output;
            }
            cli::handle_snapshot(scan, &config).await
        }
        Command::Suggest { scan } => {
            let mut config = ConfigLoader::load(scan.cluster.as_deref())
                .context("Failed to load configuration")?;
            if let Some(output) = args.output {
                config.output = output;
            }
            cli::handle_suggest(scan, &config).await
        }
    }
}
