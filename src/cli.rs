//! # partner-catalog CLI
//!
//! Command parsing and the async [`run`] entrypoint used by `main` and by the
//! integration tests. Business logic lives in the library modules; this
//! module wires configuration, the image probe and the remote store into
//! them and turns failures into an error for a non-zero exit.
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::aggregate::{build_manifest, Validator};
use crate::assets::ImageCrateProbe;
use crate::config::CatalogConfig;
use crate::load_config::{load_config, load_remote_config};
use crate::publish::publish;
use crate::scan::list_partner_sources;
use crate::store::R2Store;

/// CLI for partner-catalog: validate partner records and publish the manifest.
#[derive(Parser)]
#[clap(
    name = "partner-catalog",
    version,
    about = "Validate partner records and publish the partner manifest and images"
)]
pub struct Cli {
    /// Path to a YAML catalog config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding one sub-directory per partner (overrides the config file)
    #[clap(long, global = true)]
    pub partners_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every partner and fail if any is invalid
    Check,
    /// Build the manifest and write it to a local file
    Generate {
        /// Output path (defaults to the configured manifest file name)
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Validate, upload the manifest and images, and remove images of departed partners
    Publish,
}

fn resolve_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CatalogConfig::default(),
    };
    if let Some(dir) = &cli.partners_dir {
        config.partners_dir = dir.clone();
    }
    Ok(config)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = Arc::new(resolve_config(&cli)?);
    let validator = Validator::new(Arc::clone(&config), Arc::new(ImageCrateProbe));
    let sources = list_partner_sources(&config.partners_dir, &config.example_dir_name);

    match cli.command {
        Commands::Check => {
            tracing::info!(command = "check", partners = sources.len(), "Validating partner info");
            let reports = validator.validate_all(&sources).await;
            let invalid: Vec<_> = reports.iter().filter(|r| !r.is_valid()).collect();
            for report in &invalid {
                eprintln!(
                    "Errors in {}:\n{}",
                    report.source.display(),
                    report.errors.join("\n")
                );
            }
            if !invalid.is_empty() {
                tracing::error!(command = "check", invalid = invalid.len(), "Validation failed");
                anyhow::bail!(
                    "{} of {} partner(s) failed validation",
                    invalid.len(),
                    reports.len()
                );
            }
            println!("All {} partner(s) are valid.", reports.len());
            Ok(())
        }
        Commands::Generate { output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.manifest_file_name));
            tracing::info!(command = "generate", output = %output.display(), "Building manifest");
            let manifest = build_manifest(&sources, &config.declaration_file);
            manifest
                .write_local(&output)
                .with_context(|| format!("Failed to write manifest to {}", output.display()))?;
            println!(
                "Wrote {} partner(s) to {}",
                manifest.len(),
                output.display()
            );
            Ok(())
        }
        Commands::Publish => {
            let remote = load_remote_config(&config)?;
            let store = R2Store::new(&remote)
                .map_err(|e| anyhow!("Failed to construct object store client: {e}"))?;
            let manifest = build_manifest(&sources, &config.declaration_file);
            tracing::info!(command = "publish", partners = manifest.len(), "Starting publish");
            match publish(&store, &validator, &remote.object_key, &manifest, &sources).await {
                Ok(report) => {
                    tracing::info!(command = "publish", ?report, "Publish complete");
                    println!(
                        "Published {} partner(s): {} image(s) uploaded, {} failed, {} stale image(s) deleted.",
                        report.partners,
                        report.uploaded.len(),
                        report.failed_uploads.len(),
                        report.deleted.len()
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(anyhow::Error::new(e).context("Publish failed"))
                }
            }
        }
    }
}
