//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_vendor_base().with_smartbox_patches();
//!     fixture.command().arg("build").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::env;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::fixtures;
    #[allow(unused_imports)]
    pub use super::should_skip_git_tests;
    pub use super::TestFixture;
}

/// Configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Renames the bundle and the output directory.
    pub const CUSTOM: &str = r#"
output_dir: dist
bundle:
  name: Acme
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";

    /// Well-formed YAML with a misspelled key.
    pub const UNKNOWN_KEY: &str = "vendor_directory: PrusaResearch\n";
}

/// Vendor and patch file contents.
#[allow(dead_code)]
pub mod fixtures {
    /// Vendor base configuration, version 2.5.0.
    pub const BASE_INI: &str = "\
# Prusa Research configuration
[vendor]
name = Prusa Research
config_version = 2.5.0 # vendor version

[filament:Old PLA]
temperature = 210

[printer:*common*]
bed_shape = 0x0,250x0,250x210,0x210
";

    /// Vendor catalog shipped next to the base.
    pub const VENDOR_INDEX: &str = "min_slic3r_version = 2.6.0\n2.5.0 Vendor release\n";

    /// Removes the `Old PLA` section from the base.
    pub const OLD_PLA_REMOVAL: &str = "[filament:Old PLA]\ntemperature = 210\n";

    /// Adds a `Smartbox PETG` filament.
    pub const PETG_ADDITION: &str = "[filament:Smartbox PETG] # ours\ntemperature = 240\n";

    /// Removal fragment that matches nothing in the base.
    pub const STALE_REMOVAL: &str = "[filament:Long Gone]\ntemperature = 1\n";
}

/// Check if tests that need a real `git` binary should be skipped.
///
/// Returns `true` if the `SKIP_GIT_TESTS` environment variable is set.
#[allow(dead_code)]
pub fn should_skip_git_tests() -> bool {
    env::var("SKIP_GIT_TESTS").is_ok()
}

/// A temporary project directory with optional vendor files and patches.
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_vendor_base()
///     .with_file("Smartbox/petg.add.ini", fixtures::PETG_ADDITION);
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.smartbox-bundle.yaml` configuration file with the given content.
    #[allow(dead_code)]
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".smartbox-bundle.yaml", content)
    }

    /// Add the vendor base, its catalog and a printer model asset.
    pub fn with_vendor_base(self) -> Self {
        self.with_file("PrusaResearch/2.5.0.ini", fixtures::BASE_INI)
            .with_file("PrusaResearch/index.idx", fixtures::VENDOR_INDEX)
            .with_file("PrusaResearch/MK4.svg", "<svg/>")
    }

    /// Add one removal, one addition and a thumbnail to `Smartbox/`.
    pub fn with_smartbox_patches(self) -> Self {
        self.with_file("Smartbox/old-pla.rm.ini", fixtures::OLD_PLA_REMOVAL)
            .with_file("Smartbox/petg.add.ini", fixtures::PETG_ADDITION)
            .with_binary_file("Smartbox/smartbox.png", &[0x89, b'P', b'N', b'G'])
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file with the given path and content.
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the default output directory.
    #[allow(dead_code)]
    pub fn build_dir(&self) -> PathBuf {
        self.temp_dir.path().join("build")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command configured to run in this fixture's directory.
    ///
    /// Git lookups are fenced at the temp directory so the version is always
    /// derived from the vendor base, whatever repository the tests run in.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("smartbox-bundle");
        cmd.current_dir(self.path())
            .env("GIT_CEILING_DIRECTORIES", self.ceiling())
            .env("NO_COLOR", "1")
            .env_remove("SMARTBOX_BUNDLE_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn ceiling(&self) -> PathBuf {
        self.path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.path().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_vendor_base() {
        let fixture = TestFixture::new().with_vendor_base();
        assert!(fixture.path().join("PrusaResearch/2.5.0.ini").exists());
        assert!(fixture.path().join("PrusaResearch/index.idx").exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        let parsed: serde_yaml::Value = serde_yaml::from_str(configs::CUSTOM).unwrap();
        assert!(parsed.get("bundle").is_some());
    }
}
