//! # Patch Set Loading
//!
//! The patch directory holds two kinds of fragment files next to arbitrary
//! assets:
//!
//! - `*.add.*` files carry configuration sections to insert into the base
//!   document.
//! - `*.rm.*` files carry text that must be deleted from it.
//!
//! Every fragment is normalized on load (see [`crate::normalize`]). Blank
//! fragments are dropped. Any other non-hidden file is an auxiliary asset that
//! ends up next to the merged document in the offline archive.
//!
//! Each fragment also declares the filament profiles it touches: the names of
//! its `[filament:<name>]` section headers, ignoring variant headers whose
//! name contains `@`. Reconciling these names across all fragments yields the
//! [`EntityChangeSet`] reported in the catalog and release notes.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

const ENTITY_HEADER_PREFIX: &str = "[filament:";

/// What a fragment does to the base document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Addition,
    Removal,
}

impl FragmentKind {
    /// Classify a file name: `*.add.*` or `*.rm.*`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.contains(".add.") {
            Some(FragmentKind::Addition)
        } else if name.contains(".rm.") {
            Some(FragmentKind::Removal)
        } else {
            None
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::Addition => f.write_str("addition"),
            FragmentKind::Removal => f.write_str("removal"),
        }
    }
}

/// A normalized patch fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    kind: FragmentKind,
    source: String,
    document: Document,
    entities: BTreeSet<String>,
}

impl Fragment {
    /// Normalize `text` and extract the entity names it declares.
    pub fn new(kind: FragmentKind, source: impl Into<String>, text: &str) -> Self {
        let document = Document::raw(text).normalize();
        let entities = extract_entities(document.as_str());
        Self {
            kind,
            source: source.into(),
            document,
            entities,
        }
    }

    pub fn addition(source: impl Into<String>, text: &str) -> Self {
        Self::new(FragmentKind::Addition, source, text)
    }

    pub fn removal(source: impl Into<String>, text: &str) -> Self {
        Self::new(FragmentKind::Removal, source, text)
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Identifier used in logs and errors (the file name)
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Fragment body as matched or inserted by the merge engine.
    ///
    /// Trailing line terminators are not part of the body: a removal file that
    /// ends with a newline still matches a section at the very end of the base
    /// document.
    pub fn content(&self) -> &str {
        self.document.as_str().trim_end_matches('\n')
    }

    pub fn entities(&self) -> &BTreeSet<String> {
        &self.entities
    }

    pub fn is_blank(&self) -> bool {
        self.document.is_blank()
    }
}

/// Names of the `[filament:<name>]` headers in `text`.
///
/// Matching is literal: the header must start the line, and the name runs up
/// to the first `]`. Names containing `@` are variants and are skipped.
pub fn extract_entities(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter_map(|line| line.strip_prefix(ENTITY_HEADER_PREFIX))
        .filter_map(|rest| rest.find(']').map(|end| &rest[..end]))
        .filter(|name| !name.contains('@'))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Filament names grouped by how the bundle changes them.
///
/// The three sets are disjoint. A name declared by both an addition and a
/// removal is `replaced`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityChangeSet {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub replaced: BTreeSet<String>,
}

impl EntityChangeSet {
    pub fn reconcile(additions: &[Fragment], removals: &[Fragment]) -> Self {
        let declared = |fragments: &[Fragment]| -> BTreeSet<String> {
            fragments
                .iter()
                .flat_map(|f| f.entities().iter().cloned())
                .collect()
        };
        let added = declared(additions);
        let removed = declared(removals);
        let replaced: BTreeSet<String> = added.intersection(&removed).cloned().collect();

        Self {
            added: added.difference(&replaced).cloned().collect(),
            removed: removed.difference(&replaced).cloned().collect(),
            replaced,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.replaced.is_empty()
    }

    /// Filaments the bundle ships: added and replaced ones.
    pub fn shipped(&self) -> BTreeSet<&str> {
        self.added
            .iter()
            .chain(self.replaced.iter())
            .map(String::as_str)
            .collect()
    }
}

/// All fragments and assets found in a patch directory
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    pub additions: Vec<Fragment>,
    pub removals: Vec<Fragment>,
    /// Auxiliary files keyed by file name
    pub assets: MemoryFS,
}

impl PatchSet {
    /// Load every fragment and asset directly inside `dir`.
    ///
    /// Files are visited in file-name order. Hidden files and subdirectories
    /// are ignored.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::MissingSource {
                path: dir.to_path_buf(),
                message: "patch directory does not exist".to_string(),
            });
        }

        let mut set = PatchSet::default();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }

            match FragmentKind::from_file_name(&name) {
                Some(kind) => {
                    let text = std::fs::read_to_string(entry.path())
                        .map_err(|e| Error::read(entry.path(), e))?;
                    set.push(Fragment::new(kind, name, &text));
                }
                None => {
                    debug!("Asset {}", name);
                    let content =
                        std::fs::read(entry.path()).map_err(|e| Error::read(entry.path(), e))?;
                    set.assets.add_file_content(&name, content)?;
                }
            }
        }

        info!(
            "Found {} addition and {} removal fragments, {} assets in {}",
            set.additions.len(),
            set.removals.len(),
            set.assets.len(),
            dir.display()
        );
        Ok(set)
    }

    /// Add a fragment, dropping blank ones.
    pub fn push(&mut self, fragment: Fragment) {
        if fragment.is_blank() {
            match fragment.kind() {
                FragmentKind::Addition => {
                    info!("Skipping empty addition fragment {}", fragment.source())
                }
                FragmentKind::Removal => {
                    warn!("Skipping empty removal fragment {}", fragment.source())
                }
            }
            return;
        }

        debug!(
            "Loaded {} fragment {} ({} filaments)",
            fragment.kind(),
            fragment.source(),
            fragment.entities().len()
        );
        match fragment.kind() {
            FragmentKind::Addition => self.additions.push(fragment),
            FragmentKind::Removal => self.removals.push(fragment),
        }
    }

    pub fn change_set(&self) -> EntityChangeSet {
        EntityChangeSet::reconcile(&self.additions, &self.removals)
    }
}
