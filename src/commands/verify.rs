//! # Verify Command Implementation
//!
//! Reopens an offline archive and runs the same structural validation the
//! build performs before writing: manifest and nested index archive present,
//! at least one vendor asset, and a nested archive holding only the catalog.

use anyhow::{Context, Result};
use clap::Args;
use smartbox_bundle::archive;
use smartbox_bundle::config;
use smartbox_bundle::defaults::CONFIG_ENV_VAR;
use smartbox_bundle::output::OutputConfig;
use std::path::PathBuf;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Offline archive to check
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Path to config file (defaults to .smartbox-bundle.yaml when present)
    #[arg(short, long, value_name = "PATH", env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// List every archive entry
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the verify command
pub fn execute(args: VerifyArgs, out: &OutputConfig) -> Result<()> {
    let root = std::env::current_dir().context("Failed to get current directory")?;
    let config = config::load(args.config.as_deref(), &root)?;
    let report = archive::validate_file(&config.archive_layout(), &args.archive)?;

    println!(
        "{} {} is valid",
        out.icon("✅", "[OK]"),
        args.archive.display()
    );
    println!("   {} total entries", report.entries.len());
    println!(
        "   {} {} files",
        report.mirrored_assets.len(),
        config.vendor_name
    );
    println!("   Catalog: {}", report.catalog_entry);
    if args.verbose {
        for entry in &report.entries {
            println!("   - {}", entry);
        }
    }
    Ok(())
}
