//! # Catalog (index) Generation
//!
//! PrusaSlicer decides whether a configuration update is available by reading
//! the vendor index: a minimum slicer version line followed by one line per
//! released configuration version. The generated catalog puts the entry for
//! the bundle being built first and keeps the vendor's own history below it.
//!
//! Lines of the prior catalog that describe earlier bundle releases are
//! dropped on every generation, so there is only ever one bundle entry. A line
//! belongs to the bundle when its leading version token carries the
//! superseded bundle major (`9.x.y` by default) or when its text contains the
//! bundle description. Every other line is copied verbatim.

use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::patches::EntityChangeSet;
use crate::version::{parse_triple, Lineage, LineageVersion};

const MIN_VERSION_KEY: &str = "min_slic3r_version";

/// How catalog lines are generated and classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPolicy {
    pub min_slicer_version: String,
    /// Major number earlier bundle releases were published under
    pub superseded_major: u64,
    /// Text identifying a bundle entry
    pub description: String,
    /// Vendor name used in "based on <label> <version>"
    pub vendor_label: String,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            min_slicer_version: "2.8.1".to_string(),
            superseded_major: 9,
            description: "Smartbox custom configuration bundle".to_string(),
            vendor_label: "Prusa".to_string(),
        }
    }
}

impl CatalogPolicy {
    /// Which lineage a prior catalog line describes.
    pub fn classify(&self, line: &str) -> Lineage {
        let superseded = leading_major(line) == Some(self.superseded_major);
        if superseded || line.contains(&self.description) {
            Lineage::Bundle
        } else {
            Lineage::Base
        }
    }
}

/// Major number of the version token a catalog line starts with.
///
/// Pre-release suffixes such as `1.9.0-alpha0` are accepted.
fn leading_major(line: &str) -> Option<u64> {
    let token = line.split_whitespace().next()?;
    let core = token.split(['-', '+']).next()?;
    parse_triple(core).map(|version| version.major)
}

/// Change summary used in the catalog entry, without the final period.
pub fn summary_line(changes: &EntityChangeSet) -> String {
    let clause = |label: &str, names: &std::collections::BTreeSet<String>| {
        (!names.is_empty()).then(|| {
            format!(
                "{}: {}",
                label,
                names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            )
        })
    };

    let clauses: Vec<String> = [
        clause("Added", &changes.added),
        clause("Updated", &changes.replaced),
        clause("Removed", &changes.removed),
    ]
    .into_iter()
    .flatten()
    .collect();

    if clauses.is_empty() {
        "No filament changes".to_string()
    } else {
        clauses.join(". ")
    }
}

/// Catalog line announcing the bundle version.
pub fn entry_line(
    policy: &CatalogPolicy,
    version: &LineageVersion,
    changes: &EntityChangeSet,
    base: &LineageVersion,
) -> String {
    format!(
        "{} {} based on {} {}. {}.",
        version,
        policy.description,
        policy.vendor_label,
        base,
        summary_line(changes)
    )
}

/// Generate the catalog text.
///
/// `prior` is the vendor's current index, if there is one. The result always
/// ends with a newline.
pub fn generate(
    policy: &CatalogPolicy,
    version: &LineageVersion,
    changes: &EntityChangeSet,
    base: &LineageVersion,
    prior: Option<&str>,
) -> String {
    let mut lines = vec![
        format!("{} = {}", MIN_VERSION_KEY, policy.min_slicer_version),
        entry_line(policy, version, changes, base),
    ];

    let mut dropped = 0;
    for line in prior.unwrap_or_default().lines().map(str::trim) {
        if line.is_empty() || line.starts_with(MIN_VERSION_KEY) {
            continue;
        }
        match policy.classify(line) {
            Lineage::Bundle => {
                debug!("Dropping earlier bundle entry: {}", line);
                dropped += 1;
            }
            Lineage::Base => lines.push(line.to_string()),
        }
    }

    info!(
        "Generated catalog with {} entries ({} earlier bundle entries replaced)",
        lines.len() - 1,
        dropped
    );
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Read the vendor's current index.
///
/// A missing file is recoverable: it is logged and reported as `None`.
pub fn load_prior(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let err = Error::CatalogMissing {
                path: path.to_path_buf(),
            };
            warn!("{}", err);
            Ok(None)
        }
        Err(e) => Err(Error::read(path, e)),
    }
}
