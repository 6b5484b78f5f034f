//! Line-oriented text documents.
//!
//! A [`Document`] is either *raw* (exactly as read from disk) or *normalized*
//! (comments stripped by [`crate::normalize`]). Documents are never edited in
//! place: every transformation returns a new value.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::normalize::normalize;

/// A text document with a raw or normalized view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    normalized: bool,
}

impl Document {
    /// Wrap text as read, without normalizing it.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            normalized: false,
        }
    }

    /// Read a raw document from disk.
    ///
    /// A missing file is reported as [`Error::MissingSource`].
    pub fn read(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::raw(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::MissingSource {
                path: path.to_path_buf(),
                message: "file does not exist".to_string(),
            }),
            Err(e) => Err(Error::read(path, e)),
        }
    }

    /// Build a document from text that is already normalized.
    pub(crate) fn from_normalized(text: String) -> Self {
        Self {
            text,
            normalized: true,
        }
    }

    /// Return the normalized view of this document.
    pub fn normalize(&self) -> Document {
        if self.normalized {
            return self.clone();
        }
        Self::from_normalized(normalize(&self.text))
    }

    #[cfg(test)]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.text.lines()
    }

    /// True when the document holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
