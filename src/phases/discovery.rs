//! Phase 1: Discovery
//!
//! Reads every input of the build:
//!
//! - the latest vendor base configuration, the file in the vendor directory
//!   named `MAJOR.MINOR.PATCH.ini` with the highest version;
//! - the vendor catalog (`index.idx`), which may be absent;
//! - the vendor assets: every other non-hidden file in the vendor directory
//!   except `*.ini` files;
//! - the patch set.
//!
//! A missing vendor directory, base configuration or patch directory is fatal.

use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use super::Sources;
use crate::catalog;
use crate::config::BundleConfig;
use crate::defaults::CATALOG_FILE;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;
use crate::patches::PatchSet;
use crate::version::{parse_triple, LineageVersion};

/// Execute Phase 1: read the vendor directory and the patch directory.
pub fn execute(config: &BundleConfig, root: &Path) -> Result<Sources> {
    let vendor_dir = config.vendor_path(root);
    if !vendor_dir.is_dir() {
        return Err(Error::MissingSource {
            path: vendor_dir,
            message: "vendor directory does not exist".to_string(),
        });
    }

    let (base_path, base_version) = find_latest_base(&vendor_dir)?;
    info!("Found latest ini file: {}", base_path.display());
    let base = Document::read(&base_path)?;

    let prior_catalog = catalog::load_prior(&vendor_dir.join(CATALOG_FILE))?;
    let vendor_assets = collect_vendor_assets(&vendor_dir)?;
    let patches = PatchSet::load(&config.patch_path(root))?;

    Ok(Sources {
        vendor_dir,
        base_path,
        base,
        base_version,
        prior_catalog,
        vendor_assets,
        patches,
    })
}

/// Regular, non-hidden files directly inside `dir`, in file-name order.
fn top_level_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type().is_file() && !name.starts_with('.') {
            files.push((name, entry.into_path()));
        }
    }
    Ok(files)
}

/// Version encoded in a base configuration file name, e.g. `2.5.0.ini`.
pub fn base_version_of(file_name: &str) -> Option<LineageVersion> {
    let stem = file_name.strip_suffix(".ini")?;
    parse_triple(stem).map(LineageVersion::base)
}

/// Select the base configuration with the highest version.
pub fn find_latest_base(vendor_dir: &Path) -> Result<(PathBuf, LineageVersion)> {
    top_level_files(vendor_dir)?
        .into_iter()
        .filter_map(|(name, path)| base_version_of(&name).map(|version| (path, version)))
        .max_by(|(_, a), (_, b)| a.version.cmp(&b.version))
        .ok_or_else(|| Error::MissingSource {
            path: vendor_dir.to_path_buf(),
            message: "no MAJOR.MINOR.PATCH.ini base configuration found".to_string(),
        })
}

/// Load the vendor files that are mirrored verbatim into the offline archive.
pub fn collect_vendor_assets(vendor_dir: &Path) -> Result<MemoryFS> {
    let mut assets = MemoryFS::new();
    for (name, path) in top_level_files(vendor_dir)? {
        if name == CATALOG_FILE || name.ends_with(".ini") {
            continue;
        }
        debug!("Vendor asset {}", name);
        let content = std::fs::read(&path).map_err(|e| Error::read(&path, e))?;
        assets.add_file_content(&name, content)?;
    }
    info!("Found {} vendor assets", assets.len());
    Ok(assets)
}
