//! Phase 3: Assembly
//!
//! Runs the merge engine over the base configuration and reconciles the
//! filament names declared by the fragments. An unmatched removal fragment
//! aborts the build here, before any metadata is produced.

use log::info;

use super::{Assembly, Sources, Versioning};
use crate::config::BundleConfig;
use crate::error::Result;

/// Execute Phase 3: merge the patch set into the base configuration.
pub fn execute(config: &BundleConfig, sources: &Sources, versioning: &Versioning) -> Result<Assembly> {
    let patches = &sources.patches;
    let outcome = config.merge_engine().run(
        &sources.base,
        &patches.removals,
        &patches.additions,
        &versioning.version().to_string(),
    )?;
    let changes = patches.change_set();

    info!(
        "Merged {} fragments into {} ({} bytes)",
        outcome.applied_fragments().len(),
        sources.base_path.display(),
        outcome.document().len()
    );
    Ok(Assembly { outcome, changes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::error::Error;
    use crate::filesystem::MemoryFS;
    use crate::patches::{Fragment, PatchSet};
    use crate::version::{LineageVersion, ResolvedVersion, VersionSource};
    use semver::Version;
    use std::path::PathBuf;

    fn versioning() -> Versioning {
        Versioning {
            resolved: ResolvedVersion {
                version: LineageVersion::bundle(Version::new(2, 6, 0)),
                source: VersionSource::Fallback,
                degraded: Vec::new(),
            },
            git_info: None,
            commits: Vec::new(),
        }
    }

    fn sources(patches: PatchSet) -> Sources {
        Sources {
            vendor_dir: PathBuf::from("PrusaResearch"),
            base_path: PathBuf::from("PrusaResearch/2.5.0.ini"),
            base: Document::raw(
                "config_version = 2.5.0\n[filament:Old]\nx = 1\n\n[printer:*common*]\n",
            ),
            base_version: LineageVersion::base(Version::new(2, 5, 0)),
            prior_catalog: None,
            vendor_assets: MemoryFS::new(),
            patches,
        }
    }

    #[test]
    fn test_assembly_merges_and_reconciles() {
        let mut patches = PatchSet::default();
        patches.push(Fragment::removal("old.rm.ini", "[filament:Old]\nx = 1\n"));
        patches.push(Fragment::addition("old.add.ini", "[filament:Old]\nx = 2\n"));
        let assembly = execute(&BundleConfig::default(), &sources(patches), &versioning()).unwrap();

        let doc = assembly.document().as_str();
        assert!(doc.starts_with("config_version = 2.6.0\n"));
        assert!(doc.contains("[filament:Old]\nx = 2\n\n\n\n\n[printer:*common*]"));
        assert!(!doc.contains("x = 1"));
        assert!(assembly.changes.replaced.contains("Old"));
    }

    #[test]
    fn test_assembly_fails_on_stale_removal() {
        let mut patches = PatchSet::default();
        patches.push(Fragment::removal("stale.rm.ini", "[filament:Gone]"));
        let err = execute(&BundleConfig::default(), &sources(patches), &versioning()).unwrap_err();
        assert!(matches!(err, Error::PatchNotFound { .. }));
    }
}
