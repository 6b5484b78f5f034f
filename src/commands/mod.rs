//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `smartbox-bundle` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `smartbox_bundle` library.

pub mod build;
pub mod completions;
pub mod verify;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use smartbox_bundle::config::{self, BundleConfig};
use smartbox_bundle::defaults::CONFIG_ENV_VAR;
use smartbox_bundle::patches::EntityChangeSet;

/// Options locating the project inputs, shared by `build` and `version`
#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    /// Path to config file (defaults to .smartbox-bundle.yaml when present)
    #[arg(short, long, value_name = "PATH", env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Vendor directory holding the base configuration
    #[arg(long, value_name = "PATH")]
    pub vendor_dir: Option<PathBuf>,

    /// Directory holding the *.add.ini and *.rm.ini fragments
    #[arg(long, value_name = "PATH")]
    pub patch_dir: Option<PathBuf>,

    /// Git repository used for version resolution (defaults to the project root)
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,
}

impl ProjectArgs {
    /// Load the configuration and apply the command-line overrides.
    ///
    /// Returns the configuration and the project root.
    pub fn load(&self) -> Result<(BundleConfig, PathBuf)> {
        let root = std::env::current_dir().context("Failed to get current directory")?;
        let mut config = config::load(self.config.as_deref(), &root)?;
        if let Some(dir) = &self.vendor_dir {
            config.vendor_dir = dir.clone();
        }
        if let Some(dir) = &self.patch_dir {
            config.patch_dir = dir.clone();
        }
        Ok((config, root))
    }

    /// Directory the git queries run in.
    pub fn repo_dir(&self, root: &Path) -> PathBuf {
        self.repo.clone().unwrap_or_else(|| root.to_path_buf())
    }
}

/// One line per non-empty change category, e.g. `Added: PETG, PLA`.
pub fn change_lines(changes: &EntityChangeSet) -> Vec<String> {
    [
        ("Added", &changes.added),
        ("Updated", &changes.replaced),
        ("Removed", &changes.removed),
    ]
    .into_iter()
    .filter(|(_, names)| !names.is_empty())
    .map(|(label, names)| {
        format!(
            "{}: {}",
            label,
            names.iter().cloned().collect::<Vec<_>>().join(", ")
        )
    })
    .collect()
}
