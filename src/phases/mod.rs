//! Implementation of the phases of a bundle build.
//!
//! ## Overview
//!
//! A build runs 6 phases, strictly in order:
//! 1. Discovery - Locate the base configuration, prior catalog, vendor assets and patches
//! 2. Versioning - Resolve the bundle version and collect repository facts
//! 3. Assembly - Run the merge engine and reconcile the filament changes
//! 4. Metadata - Generate the catalog, release notes, manifest and version info
//! 5. Packaging - Build and validate the archives
//! 6. Writing to Disk - Write the staged output directory
//!
//! Phases 1-5 only read from disk. Their output is staged in a [`MemoryFS`]
//! keyed by output-relative path, so a failing build never leaves partial
//! release files behind.

use crate::document::Document;
use crate::filesystem::MemoryFS;
use crate::git::{CommitSummary, GitInfo};
use crate::merge::MergeOutcome;
use crate::patches::{EntityChangeSet, PatchSet};
use crate::version::{LineageVersion, ResolvedVersion};
use std::path::PathBuf;

// Phase modules
pub mod assembly;
pub mod discovery;
pub mod metadata;
pub mod orchestrator;
pub mod packaging;
pub mod versioning;
pub mod write;

pub use discovery as phase1;
pub use versioning as phase2;
pub use assembly as phase3;
pub use metadata as phase4;
pub use packaging as phase5;
pub use write as phase6;

/// Everything read from disk by the discovery phase
#[derive(Debug, Clone)]
pub struct Sources {
    pub vendor_dir: PathBuf,
    /// Path of the selected `MAJOR.MINOR.PATCH.ini`
    pub base_path: PathBuf,
    /// Raw base configuration
    pub base: Document,
    pub base_version: LineageVersion,
    /// Contents of the vendor `index.idx`, if present
    pub prior_catalog: Option<String>,
    /// Vendor files mirrored into the offline archive, keyed by file name
    pub vendor_assets: MemoryFS,
    pub patches: PatchSet,
}

/// Output of the versioning phase
#[derive(Debug, Clone)]
pub struct Versioning {
    pub resolved: ResolvedVersion,
    pub git_info: Option<GitInfo>,
    pub commits: Vec<CommitSummary>,
}

impl Versioning {
    pub fn version(&self) -> &LineageVersion {
        &self.resolved.version
    }
}

/// Output of the assembly phase
#[derive(Debug, Clone)]
pub struct Assembly {
    pub outcome: MergeOutcome,
    pub changes: EntityChangeSet,
}

impl Assembly {
    pub fn document(&self) -> &Document {
        self.outcome.document()
    }
}
