//! In-memory filesystem used to stage build output.
//!
//! Nothing is written to the output directory until every artifact has been
//! produced and the offline archive has validated. Until then the artifacts
//! live here, keyed by their path relative to the output directory. Paths are
//! kept sorted, so iterating a `MemoryFS` is deterministic.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A staged file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Content as UTF-8 text
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.content).map_err(|_| Error::Filesystem {
            message: "File content is not valid UTF-8".to_string(),
        })
    }
}

/// In-memory filesystem for staging files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFS {
    /// Files stored as path -> content mapping
    files: BTreeMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || path.is_absolute() {
            return Err(Error::Filesystem {
                message: format!("Invalid staged path: '{}'", path.display()),
            });
        }
        self.files.insert(path.to_path_buf(), file);
        Ok(())
    }

    /// Add a file with content
    pub fn add_file_content<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) -> Result<()> {
        self.add_file(path, File::new(content))
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.add_file(path, File::from_string(content))
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// List all files in path order
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Merge another filesystem into this one (last-write-wins)
    pub fn merge(&mut self, other: &MemoryFS) {
        for (path, file) in &other.files {
            self.files.insert(path.clone(), file.clone());
        }
    }

    /// Iterate over all files as (path, file) pairs in path order
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut fs = MemoryFS::new();
        fs.add_file_string("manifest.json", "{}").unwrap();
        assert!(fs.exists("manifest.json"));
        assert_eq!(fs.get_file("manifest.json").unwrap().as_str().unwrap(), "{}");
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_rejects_absolute_and_empty_paths() {
        let mut fs = MemoryFS::new();
        assert!(fs.add_file_string("/etc/passwd", "x").is_err());
        assert!(fs.add_file_string("", "x").is_err());
        assert!(fs.is_empty());
    }

    #[test]
    fn test_list_files_is_sorted() {
        let mut fs = MemoryFS::new();
        fs.add_file_string("b.txt", "b").unwrap();
        fs.add_file_string("a.txt", "a").unwrap();
        fs.add_file_string("PrusaResearch/x.png", "x").unwrap();
        assert_eq!(
            fs.list_files(),
            vec![
                PathBuf::from("PrusaResearch/x.png"),
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
            ]
        );
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut vendor = MemoryFS::new();
        vendor.add_file_string("logo.svg", "vendor").unwrap();
        vendor.add_file_string("bed.stl", "bed").unwrap();
        let mut patches = MemoryFS::new();
        patches.add_file_string("logo.svg", "custom").unwrap();

        vendor.merge(&patches);
        assert_eq!(vendor.len(), 2);
        assert_eq!(vendor.get_file("logo.svg").unwrap().content, b"custom");
    }

    #[test]
    fn test_non_utf8_content() {
        let file = File::new(vec![0xff, 0xfe]);
        assert_eq!(file.size(), 2);
        assert!(file.as_str().is_err());
    }
}
