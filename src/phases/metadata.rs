//! Phase 4: Metadata
//!
//! Generates the text artifacts of a release and stages them, together with
//! the merged configuration, in the output filesystem:
//!
//! | Path                  | Content                                         |
//! |-----------------------|-------------------------------------------------|
//! | `<version>.ini`       | merged configuration, named after the bundle    |
//! | `<vendor>.ini`        | the same document under its compatibility name  |
//! | `index.idx`           | generated catalog                               |
//! | `manifest.json`       | compact bundle manifest                         |
//! | `version.txt`         | bundle version, no trailing newline             |
//! | `version_info.json`   | version, notes, filaments, base and git facts   |
//! | `release_notes.md`    | markdown release notes                          |

use log::info;

use super::{Assembly, Sources, Versioning};
use crate::catalog;
use crate::config::BundleConfig;
use crate::defaults::CATALOG_FILE;
use crate::error::Result;
use crate::filesystem::MemoryFS;
use crate::manifest::VersionInfo;
use crate::release_notes::{self, ReleaseContext};

/// Generated text artifacts, also staged in [`Metadata::staged`]
#[derive(Debug, Clone)]
pub struct Metadata {
    pub catalog: String,
    pub manifest_json: String,
    pub release_notes: String,
    pub staged: MemoryFS,
}

/// Execute Phase 4: generate and stage the release metadata.
pub fn execute(
    config: &BundleConfig,
    sources: &Sources,
    versioning: &Versioning,
    assembly: &Assembly,
) -> Result<Metadata> {
    let version = versioning.version();
    let changes = &assembly.changes;

    let catalog = catalog::generate(
        &config.catalog_policy(),
        version,
        changes,
        &sources.base_version,
        sources.prior_catalog.as_deref(),
    );

    let compat_ini = config.compat_ini();
    let release_notes = release_notes::render(&ReleaseContext {
        name: &config.bundle.name,
        organization: &config.bundle.organization,
        vendor_label: &config.bundle.vendor_label,
        version,
        base: &sources.base_version,
        min_slicer_version: &config.catalog.min_slicer_version,
        offline_archive: &config.archive.offline_name,
        compat_ini: &compat_ini,
        changes,
        commits: &versioning.commits,
    });

    let manifest_json = config.manifest.to_json()?;
    let version_info = VersionInfo {
        version: version.to_string(),
        release_notes: &release_notes,
        filaments: changes,
        prusa_base_version: sources.base_version.to_string(),
        git_info: versioning.git_info.as_ref(),
    }
    .to_json()?;

    let merged = assembly.document().as_str();
    let mut staged = MemoryFS::new();
    staged.add_file_string(format!("{}.ini", version.file_stem()), merged)?;
    staged.add_file_string(&compat_ini, merged)?;
    staged.add_file_string(CATALOG_FILE, &catalog)?;
    staged.add_file_string(&config.archive_layout().manifest_entry, &manifest_json)?;
    staged.add_file_string("version.txt", &version.to_string())?;
    staged.add_file_string("version_info.json", &version_info)?;
    staged.add_file_string("release_notes.md", &release_notes)?;

    info!("Staged {} metadata files", staged.len());
    Ok(Metadata {
        catalog,
        manifest_json,
        release_notes,
        staged,
    })
}
