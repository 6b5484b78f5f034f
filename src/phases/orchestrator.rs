//! Orchestrator for the complete build
//!
//! This module coordinates all phases to provide a clean API for a bundle
//! build, and for the lighter version query that stops after Phase 2.

use super::{phase1, phase2, phase3, phase4, phase5, phase6};
use crate::archive::ArchiveReport;
use crate::config::BundleConfig;
use crate::error::Result;
use crate::git::VersionControl;
use crate::merge::AppliedStep;
use crate::patches::EntityChangeSet;
use crate::version::{LineageVersion, ResolvedVersion};
use std::path::{Path, PathBuf};

/// Summary of a completed build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub base_path: PathBuf,
    pub base_version: LineageVersion,
    pub version: ResolvedVersion,
    pub changes: EntityChangeSet,
    /// Merge pipeline log
    pub steps: Vec<AppliedStep>,
    /// Output-relative paths of every produced file
    pub files: Vec<PathBuf>,
    pub archive: ArchiveReport,
    /// Directory the files were written to, `None` for a dry run
    pub output: Option<PathBuf>,
}

/// Summary of a version query
#[derive(Debug, Clone)]
pub struct VersionReport {
    pub base_version: LineageVersion,
    pub version: ResolvedVersion,
    pub changes: EntityChangeSet,
}

/// Execute the complete build (Phases 1-6)
///
/// 1. Discover the base configuration, catalog, assets and patches
/// 2. Resolve the bundle version
/// 3. Merge the patches into the base configuration
/// 4. Generate and stage the release metadata
/// 5. Build, validate and stage the archives
/// 6. Write the staged files to disk (if output_path is provided)
///
/// Nothing is written unless every earlier phase succeeded.
pub fn execute_build(
    config: &BundleConfig,
    root: &Path,
    vcs: &dyn VersionControl,
    output_path: Option<&Path>,
) -> Result<BuildReport> {
    // Phase 1: Discovery
    let sources = phase1::execute(config, root)?;

    // Phase 2: Versioning
    let versioning = phase2::execute(config, &sources, vcs)?;

    // Phase 3: Assembly
    let assembly = phase3::execute(config, &sources, &versioning)?;

    // Phase 4: Metadata
    let metadata = phase4::execute(config, &sources, &versioning, &assembly)?;

    // Phase 5: Packaging
    let mut staged = metadata.staged.clone();
    let archive = phase5::execute(
        config,
        &sources,
        &versioning,
        &assembly,
        &metadata,
        &mut staged,
    )?;

    // Phase 6: Write to Disk (if output path provided)
    if let Some(output) = output_path {
        phase6::execute(&staged, output)?;
    }

    Ok(BuildReport {
        base_path: sources.base_path,
        base_version: sources.base_version,
        version: versioning.resolved,
        changes: assembly.changes,
        steps: assembly.outcome.steps().to_vec(),
        files: staged.list_files(),
        archive,
        output: output_path.map(Path::to_path_buf),
    })
}

/// Resolve the bundle version without merging or writing anything (Phases 1-2)
pub fn execute_version(
    config: &BundleConfig,
    root: &Path,
    vcs: &dyn VersionControl,
) -> Result<VersionReport> {
    let sources = phase1::execute(config, root)?;
    let versioning = phase2::execute(config, &sources, vcs)?;
    Ok(VersionReport {
        changes: sources.patches.change_set(),
        base_version: sources.base_version,
        version: versioning.resolved,
    })
}
