//! # Merge Engine
//!
//! Applies the patch fragments to the vendor base document. The merge is a
//! text-level operation: fragments are matched and spliced as exact
//! substrings, and the configuration is never parsed into sections.
//!
//! ## Pipeline
//!
//! A merge runs a fixed sequence of named [`Step`]s:
//!
//! 1. `Normalize` the base document.
//! 2. `Remove` each removal fragment, in load order. The first (leftmost)
//!    occurrence of the fragment body is deleted. A fragment that does not
//!    occur fails the whole merge with [`Error::PatchNotFound`].
//! 3. `Insert` all addition fragments as one block just before the anchor
//!    section (`[printer:*common*]` by default), or at the end of the document
//!    when the anchor is absent. Fragments are separated by five newlines and
//!    the block is separated from its neighbours by five newlines.
//! 4. `StampVersion`: rewrite the first `config_version = ...` line to the
//!    bundle version.
//!
//! Every step leaves an immutable snapshot of the document behind and appends
//! an [`AppliedStep`] to the log, so a caller can tell exactly which fragment
//! was applied where.
//!
//! ## Example
//!
//! ```
//! use smartbox_bundle::document::Document;
//! use smartbox_bundle::merge::merge;
//! use smartbox_bundle::patches::Fragment;
//!
//! let base = Document::raw("A\n[printer:*common*]\nB");
//! let additions = vec![Fragment::addition("x.add.ini", "X=1")];
//! let outcome = merge(&base, &[], &additions, "2.0.0").unwrap();
//! assert_eq!(
//!     outcome.document().as_str(),
//!     "A\n\n\n\n\nX=1\n\n\n\n\n[printer:*common*]\nB"
//! );
//! ```

mod stamp;

pub use stamp::stamp_config_version;

use std::fmt;

use log::{debug, info, warn};

use crate::defaults::DEFAULT_ANCHOR;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::patches::Fragment;

/// Separator placed between addition fragments and around the addition block
pub const ADDITION_SEPARATOR: &str = "\n\n\n\n\n";

/// A named transformation in the merge pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Normalize,
    Remove {
        fragment: String,
    },
    Insert {
        fragments: Vec<String>,
        anchor_found: bool,
    },
    StampVersion {
        version: String,
        found: bool,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Normalize => write!(f, "normalize base"),
            Step::Remove { fragment } => write!(f, "remove {}", fragment),
            Step::Insert { fragments, .. } if fragments.is_empty() => write!(f, "insert nothing"),
            Step::Insert { fragments, .. } => write!(f, "insert {}", fragments.join(", ")),
            Step::StampVersion { version, .. } => write!(f, "stamp config_version {}", version),
        }
    }
}

/// Log entry for one executed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedStep {
    /// Position in the pipeline, which is also the index of the snapshot the
    /// step produced
    pub index: usize,
    pub step: Step,
    /// Byte offset in the previous snapshot where the step took effect
    pub offset: Option<usize>,
}

/// Result of a successful merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    snapshots: Vec<Document>,
    log: Vec<AppliedStep>,
}

impl MergeOutcome {
    /// The fully merged document
    pub fn document(&self) -> &Document {
        // The Normalize step always produces the first snapshot.
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn into_document(mut self) -> Document {
        self.snapshots.swap_remove(self.snapshots.len() - 1)
    }

    /// Document as it stood after step `index`
    pub fn snapshot(&self, index: usize) -> Option<&Document> {
        self.snapshots.get(index)
    }

    pub fn steps(&self) -> &[AppliedStep] {
        &self.log
    }

    /// Sources of the fragments that were applied, in order
    pub fn applied_fragments(&self) -> Vec<&str> {
        self.log
            .iter()
            .flat_map(|applied| match &applied.step {
                Step::Remove { fragment } => vec![fragment.as_str()],
                Step::Insert { fragments, .. } => fragments.iter().map(String::as_str).collect(),
                _ => Vec::new(),
            })
            .collect()
    }
}

/// Configurable merge engine
#[derive(Debug, Clone)]
pub struct MergeEngine {
    anchor: String,
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self {
            anchor: DEFAULT_ANCHOR.to_string(),
        }
    }
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marker before which additions are inserted
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// Run the full pipeline.
    pub fn run(
        &self,
        base: &Document,
        removals: &[Fragment],
        additions: &[Fragment],
        version: &str,
    ) -> Result<MergeOutcome> {
        let mut run = Run::default();
        run.record(Step::Normalize, None, base.normalize());

        for fragment in removals {
            let (offset, next) = remove_first(run.current(), fragment, run.next_index())?;
            run.record(
                Step::Remove {
                    fragment: fragment.source().to_string(),
                },
                Some(offset),
                next,
            );
        }

        let additions: Vec<&Fragment> = additions.iter().filter(|f| !f.is_blank()).collect();
        let (offset, anchor_found, next) = self.insert(run.current(), &additions);
        run.record(
            Step::Insert {
                fragments: additions.iter().map(|f| f.source().to_string()).collect(),
                anchor_found,
            },
            offset,
            next,
        );

        let (offset, next) = stamp_config_version(run.current().as_str(), version)?;
        if offset.is_none() {
            warn!("config_version not found in base configuration, version not stamped");
        } else {
            info!("Updated config_version to {}", version);
        }
        run.record(
            Step::StampVersion {
                version: version.to_string(),
                found: offset.is_some(),
            },
            offset,
            Document::from_normalized(next),
        );

        Ok(MergeOutcome {
            snapshots: run.snapshots,
            log: run.log,
        })
    }

    /// Splice the addition block in front of the anchor.
    ///
    /// Returns the insertion offset, whether the anchor was found, and the new
    /// document. Without additions the document is returned unchanged.
    fn insert(&self, working: &Document, additions: &[&Fragment]) -> (Option<usize>, bool, Document) {
        let text = working.as_str();
        let found = text.find(&self.anchor);
        if additions.is_empty() {
            debug!("No additions to insert");
            return (None, found.is_some(), working.clone());
        }

        let offset = found.unwrap_or(text.len());
        if found.is_none() {
            warn!(
                "Anchor {} not found, appending additions at end of document",
                self.anchor
            );
        }

        let block = additions
            .iter()
            .map(|f| f.content().trim_start_matches('\n'))
            .collect::<Vec<_>>()
            .join(ADDITION_SEPARATOR);

        let (head, tail) = text.split_at(offset);
        let head = head.trim_end_matches('\n');
        let mut merged = String::with_capacity(text.len() + block.len() + 2 * ADDITION_SEPARATOR.len());
        merged.push_str(head);
        if !head.is_empty() {
            merged.push_str(ADDITION_SEPARATOR);
        }
        merged.push_str(&block);
        merged.push_str(ADDITION_SEPARATOR);
        merged.push_str(tail);

        for fragment in additions {
            info!("Added content from {}", fragment.source());
        }
        (Some(head.len()), found.is_some(), Document::from_normalized(merged))
    }
}

/// Merge with the default anchor.
pub fn merge(
    base: &Document,
    removals: &[Fragment],
    additions: &[Fragment],
    version: &str,
) -> Result<MergeOutcome> {
    MergeEngine::default().run(base, removals, additions, version)
}

/// Delete the leftmost occurrence of the fragment body.
fn remove_first(working: &Document, fragment: &Fragment, step: usize) -> Result<(usize, Document)> {
    let text = working.as_str();
    let needle = fragment.content();
    let offset = text.find(needle).ok_or_else(|| Error::PatchNotFound {
        fragment: fragment.source().to_string(),
        step,
    })?;

    let mut next = String::with_capacity(text.len() - needle.len());
    next.push_str(&text[..offset]);
    next.push_str(&text[offset + needle.len()..]);

    if !needle.is_empty() && next.contains(needle) {
        warn!(
            "Content of {} occurs more than once; only the first occurrence was removed",
            fragment.source()
        );
    }
    info!("Removed content from {}", fragment.source());
    Ok((offset, Document::from_normalized(next)))
}

/// Snapshot arena and step log of a merge in progress
#[derive(Default)]
struct Run {
    snapshots: Vec<Document>,
    log: Vec<AppliedStep>,
}

impl Run {
    fn current(&self) -> &Document {
        &self.snapshots[self.snapshots.len() - 1]
    }

    fn next_index(&self) -> usize {
        self.log.len()
    }

    fn record(&mut self, step: Step, offset: Option<usize>, document: Document) {
        debug!("Step {}: {}", self.log.len(), step);
        self.log.push(AppliedStep {
            index: self.log.len(),
            step,
            offset,
        });
        self.snapshots.push(document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR_DOC: &str = "A\n[printer:*common*]\nB";

    #[test]
    fn test_scenario_single_addition() {
        let base = Document::raw(ANCHOR_DOC);
        let additions = vec![Fragment::addition("x.add.ini", "X=1")];
        let outcome = merge(&base, &[], &additions, "2.0.0").unwrap();
        assert_eq!(
            outcome.document().as_str(),
            "A\n\n\n\n\nX=1\n\n\n\n\n[printer:*common*]\nB"
        );
    }

    #[test]
    fn test_scenario_with_config_version() {
        let base = Document::raw("config_version = 2.3.0\nA\n[printer:*common*]\nB");
        let additions = vec![Fragment::addition("x.add.ini", "X=1\n")];
        let outcome = merge(&base, &[], &additions, "2.0.0").unwrap();
        assert_eq!(
            outcome.document().as_str(),
            "config_version = 2.0.0\nA\n\n\n\n\nX=1\n\n\n\n\n[printer:*common*]\nB"
        );
    }

    #[test]
    fn test_multiple_additions_are_separated() {
        let base = Document::raw(ANCHOR_DOC);
        let additions = vec![
            Fragment::addition("a.add.ini", "[filament:A]\n"),
            Fragment::addition("b.add.ini", "\n[filament:B]"),
        ];
        let doc = merge(&base, &[], &additions, "2.0.0")
            .unwrap()
            .into_document();
        assert_eq!(
            doc.as_str(),
            "A\n\n\n\n\n[filament:A]\n\n\n\n\n[filament:B]\n\n\n\n\n[printer:*common*]\nB"
        );
    }

    #[test]
    fn test_additions_appended_without_anchor() {
        let base = Document::raw("A\nB\n");
        let additions = vec![Fragment::addition("x.add.ini", "X=1")];
        let outcome = merge(&base, &[], &additions, "2.0.0").unwrap();
        assert_eq!(outcome.document().as_str(), "A\nB\n\n\n\n\nX=1\n\n\n\n\n");
        assert!(matches!(
            outcome.steps()[1].step,
            Step::Insert {
                anchor_found: false,
                ..
            }
        ));
    }

    #[test]
    fn test_anchor_at_document_start() {
        let base = Document::raw("[printer:*common*]\nB");
        let additions = vec![Fragment::addition("x.add.ini", "X=1")];
        let doc = merge(&base, &[], &additions, "2.0.0")
            .unwrap()
            .into_document();
        assert_eq!(doc.as_str(), "X=1\n\n\n\n\n[printer:*common*]\nB");
    }

    #[test]
    fn test_no_additions_leaves_document_unchanged() {
        let base = Document::raw("A # comment\n[printer:*common*]\nB");
        let outcome = merge(&base, &[], &[], "2.0.0").unwrap();
        assert_eq!(outcome.document().as_str(), "A\n[printer:*common*]\nB");
        assert_eq!(outcome.steps()[1].offset, None);
    }

    #[test]
    fn test_removal_fidelity() {
        let base = Document::raw("head\n[filament:Old]\nx = 1\n\n[filament:Keep]\ny = 2\n");
        let removals = vec![Fragment::removal("old.rm.ini", "[filament:Old]\nx = 1\n")];
        let outcome = merge(&base, &removals, &[], "2.0.0").unwrap();
        assert_eq!(
            outcome.document().as_str(),
            "head\n\n\n[filament:Keep]\ny = 2\n"
        );
        assert_eq!(outcome.steps()[1].offset, Some(5));
        assert_eq!(outcome.applied_fragments(), vec!["old.rm.ini"]);
    }

    #[test]
    fn test_removal_matches_after_comment_stripping() {
        let base = Document::raw("[filament:Old] # legacy\nx = 1   # note\nrest");
        let removals = vec![Fragment::removal("old.rm.ini", "[filament:Old]\nx = 1")];
        let doc = merge(&base, &removals, &[], "2.0.0")
            .unwrap()
            .into_document();
        assert_eq!(doc.as_str(), "\nrest");
    }

    #[test]
    fn test_removal_is_first_match_only() {
        let base = Document::raw("dup\nmiddle\ndup\n");
        let removals = vec![Fragment::removal("dup.rm.ini", "dup")];
        let doc = merge(&base, &removals, &[], "2.0.0")
            .unwrap()
            .into_document();
        assert_eq!(doc.as_str(), "\nmiddle\ndup\n");
    }

    #[test]
    fn test_removals_apply_in_order() {
        let base = Document::raw("abc");
        // The second removal only matches after the first one ran.
        let removals = vec![
            Fragment::removal("1.rm.ini", "b"),
            Fragment::removal("2.rm.ini", "ac"),
        ];
        let outcome = merge(&base, &removals, &[], "2.0.0").unwrap();
        assert_eq!(outcome.document().as_str(), "");
        assert_eq!(outcome.snapshot(1).unwrap().as_str(), "ac");
    }

    #[test]
    fn test_missing_removal_fails() {
        let base = Document::raw("[filament:A]\nx = 1\n");
        let removals = vec![
            Fragment::removal("a.rm.ini", "[filament:A]"),
            Fragment::removal("gone.rm.ini", "[filament:Gone]"),
        ];
        let err = merge(&base, &removals, &[], "2.0.0").unwrap_err();
        match err {
            Error::PatchNotFound { fragment, step } => {
                assert_eq!(fragment, "gone.rm.ini");
                assert_eq!(step, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_replacement_round() {
        let base = Document::raw(
            "config_version = 2.3.0\n[filament:PETG]\ntemp = 230\n\n[printer:*common*]\nbed = 1\n",
        );
        let removals = vec![Fragment::removal("petg.rm.ini", "[filament:PETG]\ntemp = 230")];
        let additions = vec![Fragment::addition("petg.add.ini", "[filament:PETG]\ntemp = 240")];
        let outcome = merge(&base, &removals, &additions, "2.4.0").unwrap();
        let doc = outcome.document().as_str();
        assert!(!doc.contains("temp = 230"));
        assert!(doc.contains("[filament:PETG]\ntemp = 240\n\n\n\n\n[printer:*common*]"));
        assert!(doc.starts_with("config_version = 2.4.0\n"));
        assert_eq!(outcome.steps().len(), 4);
        assert_eq!(outcome.applied_fragments(), vec!["petg.rm.ini", "petg.add.ini"]);
    }

    #[test]
    fn test_custom_anchor() {
        let base = Document::raw("A\n[obsolete_presets]\nB");
        let additions = vec![Fragment::addition("x.add.ini", "X=1")];
        let doc = MergeEngine::new()
            .with_anchor("[obsolete_presets]")
            .run(&base, &[], &additions, "2.0.0")
            .unwrap()
            .into_document();
        assert_eq!(doc.as_str(), "A\n\n\n\n\nX=1\n\n\n\n\n[obsolete_presets]\nB");
    }

    #[test]
    fn test_step_display() {
        let step = Step::Insert {
            fragments: vec!["a.add.ini".to_string(), "b.add.ini".to_string()],
            anchor_found: true,
        };
        assert_eq!(step.to_string(), "insert a.add.ini, b.add.ini");
        assert_eq!(Step::Normalize.to_string(), "normalize base");
    }
}
