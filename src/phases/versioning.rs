//! Phase 2: Versioning
//!
//! Resolves the bundle version from the tag history and the base version, and
//! collects the repository facts recorded in the release metadata. Nothing in
//! this phase fails the build: git problems degrade to the next resolution
//! tier, missing repository facts and an empty commit list.

use log::{info, warn};

use super::{Sources, Versioning};
use crate::config::BundleConfig;
use crate::error::Result;
use crate::git::{collect_git_info, VersionControl};
use crate::release_notes::COMMITS_QUERIED;
use crate::version::resolve_version;

/// Execute Phase 2: resolve the bundle version.
pub fn execute(
    config: &BundleConfig,
    sources: &Sources,
    vcs: &dyn VersionControl,
) -> Result<Versioning> {
    let policy = config.version_policy()?;
    let resolved = resolve_version(vcs, Some(&sources.base_version), &policy);
    info!(
        "Generated version {} ({}), based on {} {}",
        resolved.version, resolved.source, config.bundle.vendor_label, sources.base_version
    );

    let git_info = collect_git_info(vcs);
    if git_info.is_none() {
        warn!("Git information unavailable, version info will not record it");
    }

    let commits = vcs.recent_commits(COMMITS_QUERIED).unwrap_or_else(|e| {
        warn!("{}", e);
        Vec::new()
    });

    Ok(Versioning {
        resolved,
        git_info,
        commits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::filesystem::MemoryFS;
    use crate::git::testing::FakeRepo;
    use crate::patches::PatchSet;
    use crate::version::{LineageVersion, VersionSource};
    use semver::Version;
    use std::path::PathBuf;

    fn sources(base: &str) -> Sources {
        Sources {
            vendor_dir: PathBuf::from("PrusaResearch"),
            base_path: PathBuf::from(format!("PrusaResearch/{}.ini", base)),
            base: Document::raw(""),
            base_version: LineageVersion::base(Version::parse(base).unwrap()),
            prior_catalog: None,
            vendor_assets: MemoryFS::new(),
            patches: PatchSet::default(),
        }
    }

    #[test]
    fn test_versioning_with_tags() {
        let repo = FakeRepo::with_tags(&["2.3.0", "2.3.1"]);
        let versioning = execute(&BundleConfig::default(), &sources("2.5.0"), &repo).unwrap();
        assert_eq!(versioning.version().to_string(), "2.3.2");
        assert_eq!(versioning.git_info.unwrap().commit_hash, "abc1234");
    }

    #[test]
    fn test_versioning_without_git() {
        let versioning =
            execute(&BundleConfig::default(), &sources("2.5.0"), &FakeRepo::broken()).unwrap();
        assert_eq!(versioning.version().to_string(), "2.6.0");
        assert!(matches!(
            versioning.resolved.source,
            VersionSource::BaseDerived { .. }
        ));
        assert!(versioning.git_info.is_none());
        assert!(versioning.commits.is_empty());
    }
}
