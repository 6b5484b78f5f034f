//! # Version Command Implementation
//!
//! Prints the bundle version the next build would produce, how it was
//! derived, and the filament changes of the current patch set. Nothing is
//! merged or written.

use anyhow::Result;
use clap::Args;
use serde_json::json;
use smartbox_bundle::git::GitCli;
use smartbox_bundle::output::{OutputConfig, Tone};
use smartbox_bundle::phases::orchestrator;

use super::{change_lines, ProjectArgs};

/// Arguments for the version command
#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the version command
pub fn execute(args: VersionArgs, out: &OutputConfig) -> Result<()> {
    let (config, root) = args.project.load()?;
    let git = GitCli::new(args.project.repo_dir(&root));
    let report = orchestrator::execute_version(&config, &root, &git)?;

    if args.json {
        let value = json!({
            "version": report.version.version.to_string(),
            "source": report.version.source.to_string(),
            "prusa_base_version": report.base_version.to_string(),
            "filaments": report.changes,
            "degraded": report.version.degraded,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} Generated version: {}",
        out.icon("🏷️", "[VERSION]"),
        out.paint(Tone::Strong, &report.version.version.to_string())
    );
    println!(
        "   Based on {}: {}",
        config.bundle.vendor_label, report.base_version
    );
    println!("   Source: {}", report.version.source);
    let changes = change_lines(&report.changes);
    if changes.is_empty() {
        println!("   No filament changes");
    }
    for line in changes {
        println!("   {}", line);
    }
    Ok(())
}
