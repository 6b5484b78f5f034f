//! # Archive Packaging
//!
//! Builds the two zip archives of a release:
//!
//! - the *index archive* (`vendor_indices.zip`), holding exactly one entry,
//!   the generated catalog named `<vendor>.idx`;
//! - the *offline archive* (`prusa-fff-offline.zip`), holding the manifest,
//!   the index archive and every vendor asset mirrored under `<vendor>/`.
//!
//! Archives are canonical: entries are written in sorted order and every
//! entry carries the same fixed timestamp (the zip epoch, 1980-01-01), so
//! identical inputs produce byte-identical archives.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use log::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

/// Entry names used inside the archives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Directory the vendor assets are mirrored under
    pub vendor_name: String,
    pub manifest_entry: String,
    /// Name of the nested index archive
    pub index_archive: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            vendor_name: "PrusaResearch".to_string(),
            manifest_entry: "manifest.json".to_string(),
            index_archive: "vendor_indices.zip".to_string(),
        }
    }
}

impl ArchiveLayout {
    /// Name of the catalog inside the index archive
    pub fn catalog_entry(&self) -> String {
        format!("{}.idx", self.vendor_name)
    }

    fn vendor_prefix(&self) -> String {
        format!("{}/", self.vendor_name)
    }
}

/// What [`validate`] found in an offline archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// All entry names, in archive order
    pub entries: Vec<String>,
    /// Entries under the vendor directory
    pub mirrored_assets: Vec<String>,
    /// Name of the catalog found in the nested index archive
    pub catalog_entry: String,
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

/// Write `entries` into a new archive, in key order.
fn write_archive(entries: &BTreeMap<String, &[u8]>) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        debug!("Adding {} ({} bytes)", name, content.len());
        writer.start_file(name.as_str(), entry_options())?;
        writer.write_all(content)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Build the index archive holding the catalog.
pub fn build_index_archive(layout: &ArchiveLayout, catalog: &str) -> Result<Vec<u8>> {
    let mut entries = BTreeMap::new();
    entries.insert(layout.catalog_entry(), catalog.as_bytes());
    let bytes = write_archive(&entries)?;
    info!("Created {} ({} bytes)", layout.index_archive, bytes.len());
    Ok(bytes)
}

/// Build the offline archive.
///
/// `assets` are keyed by their path below the vendor directory and must
/// already include the merged configuration document.
pub fn build_offline_archive(
    layout: &ArchiveLayout,
    manifest_json: &str,
    index_archive: &[u8],
    assets: &MemoryFS,
) -> Result<Vec<u8>> {
    let mut entries: BTreeMap<String, &[u8]> = BTreeMap::new();
    entries.insert(layout.manifest_entry.clone(), manifest_json.as_bytes());
    entries.insert(layout.index_archive.clone(), index_archive);
    for (path, file) in assets.files() {
        let name = format!("{}{}", layout.vendor_prefix(), entry_name(path));
        entries.insert(name, &file.content);
    }

    let bytes = write_archive(&entries)?;
    info!(
        "Created offline archive with {} entries ({} bytes)",
        entries.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Archive entry name for a relative path: components joined with `/`.
fn entry_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reopen an offline archive and check its structure.
///
/// The archive must contain the manifest, the nested index archive and at
/// least one entry under the vendor directory. The nested archive must
/// contain exactly one entry, the catalog.
pub fn validate(layout: &ArchiveLayout, archive_name: &str, bytes: &[u8]) -> Result<ArchiveReport> {
    let fail = |message: String| Error::ArchiveValidation {
        archive: archive_name.to_string(),
        message,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| fail(format!("cannot open archive: {}", e)))?;
    let entries: Vec<String> = archive.file_names().map(str::to_string).collect();

    for required in [&layout.manifest_entry, &layout.index_archive] {
        if !entries.iter().any(|e| e == required) {
            return Err(fail(format!("missing required entry '{}'", required)));
        }
    }

    let prefix = layout.vendor_prefix();
    let mirrored_assets: Vec<String> = entries
        .iter()
        .filter(|e| e.starts_with(&prefix) && e.len() > prefix.len())
        .cloned()
        .collect();
    if mirrored_assets.is_empty() {
        return Err(fail(format!("no entries under '{}'", prefix)));
    }

    let mut nested = Vec::new();
    archive
        .by_name(&layout.index_archive)?
        .read_to_end(&mut nested)?;
    let nested = ZipArchive::new(Cursor::new(nested))
        .map_err(|e| fail(format!("cannot open '{}': {}", layout.index_archive, e)))?;
    let nested_entries: Vec<&str> = nested.file_names().collect();
    let catalog_entry = layout.catalog_entry();
    if nested_entries != [catalog_entry.as_str()] {
        return Err(fail(format!(
            "'{}' must contain exactly '{}', found {:?}",
            layout.index_archive, catalog_entry, nested_entries
        )));
    }

    info!(
        "Archive validation successful: {} total entries, {} {} files",
        entries.len(),
        mirrored_assets.len(),
        layout.vendor_name
    );
    Ok(ArchiveReport {
        entries,
        mirrored_assets,
        catalog_entry,
    })
}

/// Validate an archive on disk.
pub fn validate_file(layout: &ArchiveLayout, path: &Path) -> Result<ArchiveReport> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::MissingSource {
                path: path.to_path_buf(),
                message: "archive does not exist".to_string(),
            })
        }
        Err(e) => return Err(Error::read(path, e)),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    validate(layout, &name, &bytes)
}
