//! Build command implementation
//!
//! The build command executes the full 6-phase pipeline:
//! 1. Discovery of the base configuration, catalog, assets and patches
//! 2. Version resolution
//! 3. Merging the patches into the base configuration
//! 4. Generating the release metadata
//! 5. Packaging and validating the archives
//! 6. Writing to disk

use anyhow::Result;
use clap::Args;
use smartbox_bundle::git::GitCli;
use smartbox_bundle::output::{OutputConfig, Tone};
use smartbox_bundle::phases::orchestrator;
use std::path::PathBuf;
use std::time::Instant;

use super::{change_lines, ProjectArgs};

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory (defaults to build/)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Run every phase but write nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the build command
pub fn execute(args: BuildArgs, out: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();
    let (config, root) = args.project.load()?;
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_path(&root));

    if !args.quiet {
        println!(
            "{} {} Bundle Build",
            out.icon("📦", "[BUILD]"),
            config.bundle.name
        );
        println!();

        if args.dry_run {
            println!(
                "{} DRY RUN MODE - No changes will be made",
                out.icon("🔎", "[DRY RUN]")
            );
            println!();
        }
    }

    let git = GitCli::new(args.project.repo_dir(&root));
    let result = orchestrator::execute_build(
        &config,
        &root,
        &git,
        if args.dry_run {
            None
        } else {
            Some(&output_dir)
        },
    );

    match result {
        Ok(report) => {
            if args.quiet {
                return Ok(());
            }
            let duration = start_time.elapsed();
            println!(
                "{} Built {} ({}) in {:.2}s",
                out.icon("✅", "[OK]"),
                out.paint(Tone::Strong, &report.version.version.to_string()),
                report.version.source,
                duration.as_secs_f64()
            );
            println!(
                "   Based on {} {} ({})",
                config.bundle.vendor_label,
                report.base_version,
                report.base_path.display()
            );
            let changes = change_lines(&report.changes);
            if changes.is_empty() {
                println!("   No filament changes");
            }
            for line in changes {
                println!("   {}", line);
            }
            println!(
                "   {} merge steps, {} archive entries",
                report.steps.len(),
                report.archive.entries.len()
            );
            match &report.output {
                Some(dir) => println!("   {} files written to: {}", report.files.len(), dir.display()),
                None => println!("   {} files staged", report.files.len()),
            }
            Ok(())
        }
        Err(e) => {
            if !args.quiet {
                println!(
                    "{} {}",
                    out.icon("❌", "[FAILED]"),
                    out.paint(Tone::Failure, "Build failed")
                );
                println!();
            }
            Err(e.into())
        }
    }
}
