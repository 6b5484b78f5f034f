//! Phase 5: Packaging
//!
//! Builds the index archive and the offline archive, reopens the offline
//! archive to validate it, and stages both archives. The archive directory
//! receives the vendor assets, overlaid with the patch directory's assets,
//! plus the merged configuration named after the bundle version.

use log::{debug, info};

use super::metadata::Metadata;
use super::{Assembly, Sources, Versioning};
use crate::archive::{self, ArchiveReport};
use crate::config::BundleConfig;
use crate::error::Result;
use crate::filesystem::MemoryFS;

/// Execute Phase 5: build, validate and stage the archives.
pub fn execute(
    config: &BundleConfig,
    sources: &Sources,
    versioning: &Versioning,
    assembly: &Assembly,
    metadata: &Metadata,
    staged: &mut MemoryFS,
) -> Result<ArchiveReport> {
    let layout = config.archive_layout();

    let mut assets = sources.vendor_assets.clone();
    for path in sources.patches.assets.list_files() {
        if assets.exists(&path) {
            debug!("Patch asset {} overrides vendor asset", path.display());
        }
    }
    assets.merge(&sources.patches.assets);
    assets.add_file_string(
        format!("{}.ini", versioning.version().file_stem()),
        assembly.document().as_str(),
    )?;

    let index_archive = archive::build_index_archive(&layout, &metadata.catalog)?;
    let offline = archive::build_offline_archive(
        &layout,
        &metadata.manifest_json,
        &index_archive,
        &assets,
    )?;
    let report = archive::validate(&layout, &config.archive.offline_name, &offline)?;

    staged.add_file_content(&layout.index_archive, index_archive)?;
    staged.add_file_content(&config.archive.offline_name, offline)?;
    info!(
        "Packaged {} with {} {} files",
        config.archive.offline_name,
        report.mirrored_assets.len(),
        layout.vendor_name
    );
    Ok(report)
}
