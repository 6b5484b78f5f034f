//! # Bundle Version Resolution
//!
//! Two numbering spaces meet in this crate. The vendor publishes its base
//! configuration as `MAJOR.MINOR.PATCH.ini`; those numbers belong to the
//! [`Lineage::Base`] lineage. The bundle produced here carries its own release
//! number in the [`Lineage::Bundle`] lineage, derived from the git tags of the
//! patch repository. Both are plain `semver::Version`s, so every value is
//! wrapped in a [`LineageVersion`] to keep them apart.
//!
//! ## Resolution tiers
//!
//! 1. **Exact tag**: HEAD carries a tag `MAJOR.MINOR.PATCH` (optionally
//!    `v`-prefixed) in the bundle major. It is used verbatim.
//! 2. **Next patch**: the highest bundle-major tag, with its patch number
//!    incremented.
//! 3. **Base derived**: `(bundle major, base minor + 1, 0)`.
//! 4. **Fallback**: the configured fallback version (`2.4.0`).
//!
//! A failing git query never aborts resolution; it is logged and recorded on
//! the result, and the next tier is tried.

use std::fmt;

use log::{info, warn};
use semver::Version;

use crate::error::Error;
use crate::git::VersionControl;

/// Numbering space a version belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lineage {
    /// Releases of this bundle
    Bundle,
    /// Releases of the vendor base configuration
    Base,
}

/// A version tagged with its lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageVersion {
    pub lineage: Lineage,
    pub version: Version,
}

impl LineageVersion {
    pub fn bundle(version: Version) -> Self {
        Self {
            lineage: Lineage::Bundle,
            version,
        }
    }

    pub fn base(version: Version) -> Self {
        Self {
            lineage: Lineage::Base,
            version,
        }
    }

    /// `MAJOR.MINOR.PATCH` without pre-release or build metadata, as used in
    /// file names.
    pub fn file_stem(&self) -> String {
        format!(
            "{}.{}.{}",
            self.version.major, self.version.minor, self.version.patch
        )
    }
}

impl fmt::Display for LineageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// Parse a strict `MAJOR.MINOR.PATCH` triple of decimal numbers.
///
/// Unlike `semver::Version::parse` this rejects pre-release suffixes, which
/// matches how tags and vendor file names are written.
pub fn parse_triple(text: &str) -> Option<Version> {
    let mut parts = text.split('.');
    let mut next = || -> Option<u64> {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };
    let version = Version::new(next()?, next()?, next()?);
    match parts.next() {
        Some(_) => None,
        None => Some(version),
    }
}

/// Parse a git tag such as `v2.3.1` or `2.3.1`.
pub fn parse_tag(tag: &str) -> Option<Version> {
    parse_triple(tag.strip_prefix('v').unwrap_or(tag))
}

/// Rules for deriving the bundle version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPolicy {
    /// Major number of the bundle lineage
    pub bundle_major: u64,
    /// Version used when nothing else is available
    pub fallback: Version,
}

impl Default for VersionPolicy {
    fn default() -> Self {
        Self {
            bundle_major: 2,
            fallback: Version::new(2, 4, 0),
        }
    }
}

/// Which tier produced the resolved version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// HEAD is exactly this tag
    ExactTag(String),
    /// One patch above the highest bundle tag
    NextPatch { latest: Version },
    /// Derived from the vendor base version
    BaseDerived { base: Version },
    /// The configured fallback
    Fallback,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSource::ExactTag(tag) => write!(f, "exact tag {}", tag),
            VersionSource::NextPatch { latest } => write!(f, "next patch after {}", latest),
            VersionSource::BaseDerived { base } => write!(f, "derived from base {}", base),
            VersionSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Outcome of [`resolve_version`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: LineageVersion,
    pub source: VersionSource,
    /// Messages of git queries that failed along the way
    pub degraded: Vec<String>,
}

/// Resolve the bundle version. Never fails.
pub fn resolve_version(
    vcs: &dyn VersionControl,
    base: Option<&LineageVersion>,
    policy: &VersionPolicy,
) -> ResolvedVersion {
    let mut degraded = Vec::new();

    match vcs.exact_tag() {
        Ok(Some(tag)) => {
            if let Some(version) = parse_tag(&tag).filter(|v| v.major == policy.bundle_major) {
                info!("HEAD is tagged {}, using it as the bundle version", tag);
                return ResolvedVersion {
                    version: LineageVersion::bundle(version),
                    source: VersionSource::ExactTag(tag),
                    degraded,
                };
            }
        }
        Ok(None) => {}
        Err(e) => degrade(&mut degraded, e),
    }

    match vcs.tags() {
        Ok(tags) => {
            let latest = tags
                .iter()
                .filter_map(|tag| parse_tag(tag))
                .filter(|v| v.major == policy.bundle_major)
                .max();
            if let Some(latest) = latest {
                match latest.patch.checked_add(1) {
                    Some(patch) => {
                        let next = Version::new(latest.major, latest.minor, patch);
                        info!("Latest bundle tag is {}, next version is {}", latest, next);
                        return ResolvedVersion {
                            version: LineageVersion::bundle(next),
                            source: VersionSource::NextPatch { latest },
                            degraded,
                        };
                    }
                    None => warn!("Latest bundle tag {} has no next patch version", latest),
                }
            }
        }
        Err(e) => degrade(&mut degraded, e),
    }

    let derived = base.and_then(|base| {
        let minor = base.version.minor.checked_add(1);
        if minor.is_none() {
            warn!("Base version {} has no next minor version", base);
        }
        minor.map(|minor| (base, Version::new(policy.bundle_major, minor, 0)))
    });
    if let Some((base, derived)) = derived {
        info!(
            "No bundle tags found, deriving {} from base version {}",
            derived, base
        );
        return ResolvedVersion {
            version: LineageVersion::bundle(derived),
            source: VersionSource::BaseDerived {
                base: base.version.clone(),
            },
            degraded,
        };
    }

    warn!(
        "No tags and no base version available, using fallback {}",
        policy.fallback
    );
    ResolvedVersion {
        version: LineageVersion::bundle(policy.fallback.clone()),
        source: VersionSource::Fallback,
        degraded,
    }
}

fn degrade(degraded: &mut Vec<String>, err: Error) {
    warn!("{}", err);
    degraded.push(err.to_string());
}
