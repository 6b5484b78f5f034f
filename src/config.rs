//! # Configuration Schema and Parsing
//!
//! This module defines the `.smartbox-bundle.yaml` configuration file. Every
//! key is optional; an absent file, an empty file and a file that only sets a
//! few keys are all valid, with built-in defaults filling the gaps.
//!
//! ```yaml
//! vendor_dir: PrusaResearch
//! patch_dir: Smartbox
//! output_dir: build
//! anchor: "[printer:*common*]"
//! bundle:
//!   name: Smartbox
//! version:
//!   major: 2
//!   fallback: 2.4.0
//! catalog:
//!   min_slicer_version: 2.8.1
//! ```
//!
//! Paths are relative to the project root unless absolute. After parsing,
//! [`BundleConfig::validate`] checks the values that serde cannot: version
//! strings and manifest URLs.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::archive::ArchiveLayout;
use crate::catalog::CatalogPolicy;
use crate::defaults::{
    default_config_path, DEFAULT_ANCHOR, DEFAULT_OUTPUT_DIR, DEFAULT_PATCH_DIR,
    DEFAULT_VENDOR_DIR,
};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::merge::MergeEngine;
use crate::version::{parse_triple, VersionPolicy};

/// Naming of the bundle in catalog entries and release notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleSection {
    pub name: String,
    pub organization: String,
    /// Catalog entry text, also used to recognise earlier bundle entries
    pub description: String,
    pub vendor_label: String,
}

impl Default for BundleSection {
    fn default() -> Self {
        Self {
            name: "Smartbox".to_string(),
            organization: "Smartbox Assistive Technology".to_string(),
            description: "Smartbox custom configuration bundle".to_string(),
            vendor_label: "Prusa".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSection {
    /// Major number of bundle releases
    pub major: u64,
    pub fallback: String,
}

impl Default for VersionSection {
    fn default() -> Self {
        Self {
            major: 2,
            fallback: "2.4.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSection {
    pub min_slicer_version: String,
    /// Major number under which earlier bundle releases were catalogued
    pub superseded_major: u64,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            min_slicer_version: "2.8.1".to_string(),
            superseded_major: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveSection {
    pub offline_name: String,
    pub index_name: String,
}

impl Default for ArchiveSection {
    fn default() -> Self {
        Self {
            offline_name: "prusa-fff-offline.zip".to_string(),
            index_name: "vendor_indices.zip".to_string(),
        }
    }
}

/// The whole configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    pub vendor_dir: PathBuf,
    pub patch_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Vendor identifier: archive directory, catalog entry and compat ini name
    pub vendor_name: String,
    pub anchor: String,
    pub bundle: BundleSection,
    pub version: VersionSection,
    pub catalog: CatalogSection,
    pub archive: ArchiveSection,
    pub manifest: Manifest,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            vendor_dir: PathBuf::from(DEFAULT_VENDOR_DIR),
            patch_dir: PathBuf::from(DEFAULT_PATCH_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            vendor_name: DEFAULT_VENDOR_DIR.to_string(),
            anchor: DEFAULT_ANCHOR.to_string(),
            bundle: BundleSection::default(),
            version: VersionSection::default(),
            catalog: CatalogSection::default(),
            archive: ArchiveSection::default(),
            manifest: Manifest::default(),
        }
    }
}

/// Parses a YAML string into a validated `BundleConfig`.
///
/// An empty document yields the defaults.
pub fn parse(yaml_content: &str) -> Result<BundleConfig> {
    if yaml_content.trim().is_empty() {
        return Ok(BundleConfig::default());
    }
    let config: BundleConfig =
        serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some(
                "check key names and indentation; unknown keys are rejected".to_string(),
            ),
        })?;
    config.validate()?;
    Ok(config)
}

/// Parse a configuration from a YAML file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BundleConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    parse(&content)
}

/// Load the configuration for a project.
///
/// An explicit path must exist. Without one, `<root>/.smartbox-bundle.yaml`
/// is used when present, and the defaults otherwise.
pub fn load(explicit: Option<&Path>, root: &Path) -> Result<BundleConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::MissingSource {
                path: path.to_path_buf(),
                message: "configuration file does not exist".to_string(),
            });
        }
        debug!("Loading configuration from {}", path.display());
        return from_file(path);
    }

    let path = default_config_path(root);
    if path.is_file() {
        debug!("Loading configuration from {}", path.display());
        from_file(&path)
    } else {
        debug!("No configuration file, using defaults");
        Ok(BundleConfig::default())
    }
}

fn invalid(message: String, hint: &str) -> Error {
    Error::ConfigParse {
        message,
        hint: Some(hint.to_string()),
    }
}

impl BundleConfig {
    /// Check values serde accepts but the build cannot use.
    pub fn validate(&self) -> Result<()> {
        let fallback = parse_triple(&self.version.fallback).ok_or_else(|| {
            invalid(
                format!("invalid fallback version '{}'", self.version.fallback),
                "use MAJOR.MINOR.PATCH, e.g. 2.4.0",
            )
        })?;
        if fallback.major != self.version.major {
            return Err(invalid(
                format!(
                    "fallback version {} is outside bundle major {}",
                    fallback, self.version.major
                ),
                "the fallback must start with version.major",
            ));
        }
        if self.version.major == self.catalog.superseded_major {
            return Err(invalid(
                "catalog.superseded_major must differ from version.major".to_string(),
                "entries of the current bundle major are always regenerated",
            ));
        }
        semver::Version::parse(&self.catalog.min_slicer_version).map_err(|e| {
            invalid(
                format!(
                    "invalid min_slicer_version '{}': {}",
                    self.catalog.min_slicer_version, e
                ),
                "use a slicer version such as 2.8.1",
            )
        })?;

        for (key, value) in [
            ("manifest.url", &self.manifest.url),
            ("manifest.index_url", &self.manifest.index_url),
            ("manifest.offline_archive_url", &self.manifest.offline_archive_url),
        ] {
            Url::parse(value).map_err(|e| {
                invalid(
                    format!("invalid {} '{}': {}", key, value, e),
                    "use an absolute https:// URL",
                )
            })?;
        }

        for (key, value) in [
            ("vendor_name", &self.vendor_name),
            ("anchor", &self.anchor),
            ("archive.offline_name", &self.archive.offline_name),
            ("archive.index_name", &self.archive.index_name),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(
                    format!("{} must not be empty", key),
                    "remove the key to use the default",
                ));
            }
        }
        Ok(())
    }

    pub fn vendor_path(&self, root: &Path) -> PathBuf {
        root.join(&self.vendor_dir)
    }

    pub fn patch_path(&self, root: &Path) -> PathBuf {
        root.join(&self.patch_dir)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    pub fn version_policy(&self) -> Result<VersionPolicy> {
        let fallback = parse_triple(&self.version.fallback).ok_or_else(|| {
            invalid(
                format!("invalid fallback version '{}'", self.version.fallback),
                "use MAJOR.MINOR.PATCH, e.g. 2.4.0",
            )
        })?;
        Ok(VersionPolicy {
            bundle_major: self.version.major,
            fallback,
        })
    }

    pub fn catalog_policy(&self) -> CatalogPolicy {
        CatalogPolicy {
            min_slicer_version: self.catalog.min_slicer_version.clone(),
            superseded_major: self.catalog.superseded_major,
            description: self.bundle.description.clone(),
            vendor_label: self.bundle.vendor_label.clone(),
        }
    }

    pub fn archive_layout(&self) -> ArchiveLayout {
        ArchiveLayout {
            vendor_name: self.vendor_name.clone(),
            index_archive: self.archive.index_name.clone(),
            ..ArchiveLayout::default()
        }
    }

    pub fn merge_engine(&self) -> MergeEngine {
        MergeEngine::new().with_anchor(self.anchor.clone())
    }

    /// File name of the backward-compatible merged document
    pub fn compat_ini(&self) -> String {
        format!("{}.ini", self.vendor_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_config() {
        assert_eq!(parse("").unwrap(), BundleConfig::default());
        assert_eq!(parse("  \n").unwrap(), BundleConfig::default());
    }

    #[test]
    fn test_defaults_are_valid() {
        BundleConfig::default().validate().unwrap();
        let policy = BundleConfig::default().version_policy().unwrap();
        assert_eq!(policy, VersionPolicy::default());
        assert_eq!(BundleConfig::default().catalog_policy(), CatalogPolicy::default());
        assert_eq!(BundleConfig::default().archive_layout(), ArchiveLayout::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
patch_dir: patches
anchor: "[obsolete_presets]"
bundle:
  name: Acme
version:
  fallback: 2.9.0
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.patch_dir, PathBuf::from("patches"));
        assert_eq!(config.vendor_dir, PathBuf::from("PrusaResearch"));
        assert_eq!(config.anchor, "[obsolete_presets]");
        assert_eq!(config.bundle.name, "Acme");
        assert_eq!(config.bundle.organization, "Smartbox Assistive Technology");
        assert_eq!(config.version.major, 2);
        assert_eq!(config.version_policy().unwrap().fallback.to_string(), "2.9.0");
    }

    #[test]
    fn test_parse_manifest_override() {
        let yaml = r#"
manifest:
  name: Acme FFF
  url: https://example.com/acme
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.manifest.name, "Acme FFF");
        assert_eq!(config.manifest.id, "prusa-fff");
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = parse("vendor_directory: X\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { hint: Some(_), .. }));
    }

    #[test]
    fn test_parse_misspelled_manifest_key() {
        let err = parse("manifest:\n  index_ulr: https://example.com/idx.zip\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("index_ulr"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse("bundle: [unclosed\n").is_err());
    }

    #[test]
    fn test_validate_fallback_version() {
        let err = parse("version:\n  fallback: two\n").unwrap_err();
        assert!(err.to_string().contains("invalid fallback version"));

        let err = parse("version:\n  fallback: 3.0.0\n").unwrap_err();
        assert!(err.to_string().contains("outside bundle major"));
    }

    #[test]
    fn test_validate_superseded_major() {
        let err = parse("catalog:\n  superseded_major: 2\n").unwrap_err();
        assert!(err.to_string().contains("superseded_major"));
    }

    #[test]
    fn test_validate_manifest_url() {
        let err = parse("manifest:\n  index_url: not a url\n").unwrap_err();
        assert!(err.to_string().contains("manifest.index_url"));
    }

    #[test]
    fn test_validate_empty_anchor() {
        let err = parse("anchor: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("anchor must not be empty"));
    }

    #[test]
    fn test_load_default_file() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            load(None, temp_dir.path()).unwrap(),
            BundleConfig::default()
        );

        std::fs::write(
            temp_dir.path().join(".smartbox-bundle.yaml"),
            "output_dir: dist\n",
        )
        .unwrap();
        let config = load(None, temp_dir.path()).unwrap();
        assert_eq!(config.output_path(temp_dir.path()), temp_dir.path().join("dist"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("custom.yaml");
        let err = load(Some(&missing), temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::MissingSource { .. }));
    }

    #[test]
    fn test_compat_ini() {
        assert_eq!(BundleConfig::default().compat_ini(), "PrusaResearch.ini");
    }
}
