//! Default values for smartbox-bundle configuration.
//!
//! Centralized so the configuration file, the CLI and the build phases agree.

use std::path::{Path, PathBuf};

/// Configuration file looked up in the project root
pub const DEFAULT_CONFIG_FILE: &str = ".smartbox-bundle.yaml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "SMARTBOX_BUNDLE_CONFIG";

/// Section before which additions are inserted
pub const DEFAULT_ANCHOR: &str = "[printer:*common*]";

pub const DEFAULT_VENDOR_DIR: &str = "PrusaResearch";
pub const DEFAULT_PATCH_DIR: &str = "Smartbox";
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Vendor catalog file name, both in the vendor directory and in the output
pub const CATALOG_FILE: &str = "index.idx";

/// Returns the default configuration path for a project root.
///
/// The file is optional; a missing default file means built-in defaults.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}
