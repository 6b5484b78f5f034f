//! # Smartbox Bundle Library
//!
//! This library builds a customized PrusaSlicer configuration bundle: it
//! merges a vendor-supplied base configuration with a directory of named
//! patch fragments, then packages the result into an offline archive with a
//! generated catalog and release metadata. It is used by the `smartbox-bundle`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use smartbox_bundle::document::Document;
//! use smartbox_bundle::merge::merge;
//! use smartbox_bundle::patches::Fragment;
//!
//! let base = Document::raw(
//!     "config_version = 2.5.0 # vendor\n[filament:Old]\nx = 1\n[printer:*common*]\n",
//! );
//! let removals = vec![Fragment::removal("old.rm.ini", "[filament:Old]\nx = 1\n")];
//! let additions = vec![Fragment::addition("new.add.ini", "[filament:New]\nx = 2\n")];
//!
//! let outcome = merge(&base, &removals, &additions, "2.6.0").unwrap();
//! let merged = outcome.document().as_str();
//! assert!(merged.starts_with("config_version = 2.6.0\n"));
//! assert!(merged.contains("[filament:New]\nx = 2\n\n\n\n\n[printer:*common*]"));
//! assert!(!merged.contains("[filament:Old]"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Documents (`document`, `normalize`)**: configuration text in a raw and
//!   a comment-stripped view. All matching happens on the normalized view.
//! - **Patches (`patches`)**: `*.add.*` and `*.rm.*` fragments plus auxiliary
//!   assets, and the filament names they touch.
//! - **Merge engine (`merge`)**: an ordered pipeline of steps with a snapshot
//!   per step. A removal that does not match fails the build.
//! - **Versions (`version`, `git`)**: bundle and base versions as distinct
//!   lineages; the bundle version is derived from git tags.
//! - **Release artifacts (`catalog`, `release_notes`, `manifest`, `archive`)**:
//!   the vendor index, markdown notes, JSON metadata and zip archives.
//! - **In-Memory Filesystem (`filesystem`)**: output is staged here and only
//!   written once the whole build succeeded.
//!
//! ## Execution Flow
//!
//! The main entry point is `phases::orchestrator::execute_build`:
//!
//! 1.  **Discovery**: read the latest base configuration, catalog, assets and patches.
//! 2.  **Versioning**: resolve the bundle version.
//! 3.  **Assembly**: merge the patches into the base configuration.
//! 4.  **Metadata**: generate catalog, release notes, manifest and version info.
//! 5.  **Packaging**: build and validate the archives.
//! 6.  **Disk Output**: write the staged files to the output directory.

pub mod archive;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod document;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod manifest;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod patches;
pub mod phases;
pub mod release_notes;
pub mod version;

#[cfg(test)]
mod normalize_proptest;
