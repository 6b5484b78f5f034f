//! # Error Handling
//!
//! This module defines the centralized error type for the `smartbox-bundle`
//! library. It uses `thiserror` to build a single `Error` enum covering every
//! failure mode of a bundle build, with messages that name the offending
//! fragment, path or archive.
//!
//! ## Fatal and recoverable errors
//!
//! Most variants abort the build:
//!
//! - `PatchNotFound`: a removal fragment no longer matches the base document.
//! - `MissingSource`: a required input directory or file is absent.
//! - `ArchiveValidation`: the packaged archive failed its post-conditions.
//!
//! Two variants are recoverable and never escape the library:
//!
//! - `VersionTooling`: a git query failed. The version resolver absorbs it and
//!   falls through to the next tier.
//! - `CatalogMissing`: there is no prior catalog. Generation proceeds with the
//!   new entry only.
//!
//! The remaining variants wrap errors from the crates the library builds on.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for smartbox-bundle operations
#[derive(Error, Debug)]
pub enum Error {
    /// A removal fragment's content was not found in the working document.
    ///
    /// This signals drift between the patch files and the current vendor
    /// base document.
    #[error("Patch not found: content of '{fragment}' does not occur in the base configuration (merge step {step})")]
    PatchNotFound {
        /// Source identifier of the fragment (its file name)
        fragment: String,
        /// Index of the failing step in the merge pipeline
        step: usize,
    },

    /// A required input directory or file is missing.
    #[error("Missing source {}: {message}", path.display())]
    MissingSource { path: PathBuf, message: String },

    /// A source file exists but could not be read, e.g. it is not UTF-8.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The packaged archive failed structural validation.
    #[error("Archive validation failed for {archive}: {message}")]
    ArchiveValidation { archive: String, message: String },

    /// A version-control query failed.
    #[error("Version tooling degraded: {command} - {message}")]
    VersionTooling { command: String, message: String },

    /// No prior catalog was found.
    #[error("Catalog missing: {}", path.display())]
    CatalogMissing { path: PathBuf },

    /// An error occurred while parsing the configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An error occurred with an in-memory filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A zip archive error, wrapped from `zip::result::ZipError`.
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Attach the path of the file being read to an I/O error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }

    /// Whether the build can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::VersionTooling { .. } | Error::CatalogMissing { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
