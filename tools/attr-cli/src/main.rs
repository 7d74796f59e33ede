//! attr-cli - attribute sidecar tool
//!
//! Inspects .attrdata sidecars and keeps attributes.toml in step with them.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use attr_import::{
    ATTRDATA_EXT, AttrDataReader, AttributeConfigSet, ContainerSummary, scan_container,
    sidecar_path,
};
use clap::{Parser, Subcommand};

/// Config file name used when `--config` is not given
const DEFAULT_CONFIG: &str = "attributes.toml";

#[derive(Parser)]
#[command(name = "attr-cli")]
#[command(about = "Attribute sidecar tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the objects and attributes in a sidecar
    Inspect {
        /// Sidecar (.attrdata) or the model it belongs to
        input: PathBuf,
    },

    /// Create or update an attribute config from a sidecar
    SyncConfig {
        /// Sidecar (.attrdata) or the model it belongs to
        input: PathBuf,

        /// Path to attributes.toml (default: next to the sidecar)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Compare a config against a sidecar without changing either
    CheckConfig {
        /// Sidecar (.attrdata) or the model it belongs to
        input: PathBuf,

        /// Path to attributes.toml
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input } => {
            let sidecar = resolve_sidecar(&input);
            let summary = scan(&sidecar)?;

            tracing::info!("{} object(s) in {:?}:", summary.object_names.len(), sidecar);
            for name in &summary.object_names {
                tracing::info!("  object '{}'", name);
            }
            for info in &summary.attributes {
                tracing::info!("  attribute '{}': {}D", info.name, info.dimensions);
            }
        }

        Commands::SyncConfig { input, config } => {
            let sidecar = resolve_sidecar(&input);
            let config = config.unwrap_or_else(|| default_config_path(&sidecar));
            let summary = scan(&sidecar)?;

            let mut set = if config.exists() {
                AttributeConfigSet::load(&config)?
            } else {
                tracing::info!("Creating {:?}", config);
                AttributeConfigSet::default()
            };

            let report = set.sync_with(&summary);
            for name in &report.created {
                tracing::info!("Added attribute '{}'", name);
            }
            for name in &report.resized {
                tracing::info!("Resized targets of '{}'", name);
            }
            for name in &report.missing {
                tracing::warn!("Attribute '{}' is not in {:?}", name, sidecar);
            }

            set.save(&config)?;
            tracing::info!("Wrote {:?}", config);
        }

        Commands::CheckConfig { input, config } => {
            let sidecar = resolve_sidecar(&input);
            let summary = scan(&sidecar)?;
            let set = AttributeConfigSet::load(&config)?;

            let mut unconfigured: Vec<&str> = Vec::new();
            for info in &summary.attributes {
                let name = info.name.as_str();
                if set.find(name).is_none() && !unconfigured.contains(&name) {
                    unconfigured.push(name);
                }
            }

            let active = set.active_configs(&summary);
            tracing::info!(
                "{} of {} configured attribute(s) present in {:?}",
                active.len(),
                set.attributes.len(),
                sidecar
            );

            for attribute in &set.attributes {
                if !active.iter().any(|present| present.name == attribute.name) {
                    tracing::warn!(
                        "Config for '{}' has no attribute in the sidecar",
                        attribute.name
                    );
                }
            }
            for name in &unconfigured {
                tracing::warn!("Attribute '{}' has no config", name);
            }

            if !unconfigured.is_empty() {
                anyhow::bail!(
                    "{} attribute(s) in {:?} have no config (run sync-config)",
                    unconfigured.len(),
                    sidecar
                );
            }
            tracing::info!("Config covers every attribute");
        }
    }

    Ok(())
}

/// Accept either the sidecar itself or its model
fn resolve_sidecar(input: &Path) -> PathBuf {
    let is_sidecar = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ATTRDATA_EXT));

    if is_sidecar {
        input.to_path_buf()
    } else {
        sidecar_path(input)
    }
}

fn default_config_path(sidecar: &Path) -> PathBuf {
    sidecar
        .parent()
        .map(|dir| dir.join(DEFAULT_CONFIG))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn scan(sidecar: &Path) -> Result<ContainerSummary> {
    let file = File::open(sidecar).with_context(|| format!("Failed to open {:?}", sidecar))?;
    let mut reader = AttrDataReader::new(BufReader::new(file))?;
    let summary = scan_container(&mut reader)
        .with_context(|| format!("Failed to read {:?}", sidecar))?;
    Ok(summary)
}
