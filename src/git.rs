//! Read-only version-control queries.
//!
//! The build only ever asks git a handful of questions about the repository
//! holding the patch files. They are grouped behind the [`VersionControl`]
//! trait so the version resolver can be driven by a fake in tests, while
//! [`GitCli`] answers them by running the system `git` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};

/// One line of `git log`, as used in release notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub hash: String,
    /// Commit date (`YYYY-MM-DD`)
    pub date: String,
    pub message: String,
}

/// Repository facts recorded in `version_info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitInfo {
    pub commit_hash: String,
    pub commit_count: String,
    pub current_tag: Option<String>,
    pub latest_tag: Option<String>,
}

/// Queries the build needs from version control.
///
/// `exact_tag` and `latest_tag` return `Ok(None)` when git answers that there
/// is no such tag; `Err` is reserved for the tooling itself failing.
pub trait VersionControl {
    fn short_hash(&self) -> Result<String>;
    fn commit_count(&self) -> Result<u64>;
    fn exact_tag(&self) -> Result<Option<String>>;
    fn latest_tag(&self) -> Result<Option<String>>;
    fn tags(&self) -> Result<Vec<String>>;
    fn recent_commits(&self, count: usize) -> Result<Vec<CommitSummary>>;
}

/// Collect the repository facts, or `None` when git is unusable.
pub fn collect_git_info(vcs: &dyn VersionControl) -> Option<GitInfo> {
    let commit_hash = vcs.short_hash().ok()?;
    let commit_count = vcs.commit_count().ok()?;
    Some(GitInfo {
        commit_hash,
        commit_count: commit_count.to_string(),
        current_tag: vcs.exact_tag().ok().flatten(),
        latest_tag: vcs.latest_tag().ok().flatten(),
    })
}

/// [`VersionControl`] backed by the system `git` command
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Run git and return trimmed stdout, failing on a non-zero exit.
    fn run(&self, args: &[&str]) -> Result<String> {
        self.run_status(args)?.map_err(|stderr| Error::VersionTooling {
            command: format!("git {}", args.join(" ")),
            message: stderr,
        })
    }

    /// Run git; the inner `Err` carries stderr of a non-zero exit.
    fn run_status(&self, args: &[&str]) -> Result<std::result::Result<String, String>> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .map_err(|e| Error::VersionTooling {
                command: format!("git {}", args.join(" ")),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(Ok(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(Err(String::from_utf8_lossy(&output.stderr).trim().to_string()))
        }
    }

    /// Like `run`, but a failed `describe` means "no tag" unless we are not
    /// inside a repository at all.
    fn describe(&self, args: &[&str]) -> Result<Option<String>> {
        match self.run_status(args)? {
            Ok(tag) if tag.is_empty() => Ok(None),
            Ok(tag) => Ok(Some(tag)),
            Err(stderr) if stderr.contains("not a git repository") => Err(Error::VersionTooling {
                command: format!("git {}", args.join(" ")),
                message: stderr,
            }),
            Err(_) => Ok(None),
        }
    }
}

impl VersionControl for GitCli {
    fn short_hash(&self) -> Result<String> {
        self.run(&["rev-parse", "--short", "HEAD"])
    }

    fn commit_count(&self) -> Result<u64> {
        let count = self.run(&["rev-list", "--count", "HEAD"])?;
        count.parse().map_err(|_| Error::VersionTooling {
            command: "git rev-list --count HEAD".to_string(),
            message: format!("unexpected output '{}'", count),
        })
    }

    fn exact_tag(&self) -> Result<Option<String>> {
        self.describe(&["describe", "--exact-match", "--tags"])
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        self.describe(&["describe", "--tags", "--abbrev=0"])
    }

    fn tags(&self) -> Result<Vec<String>> {
        let output = self.run(&["tag", "-l"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn recent_commits(&self, count: usize) -> Result<Vec<CommitSummary>> {
        let limit = format!("-{}", count);
        let output = self.run(&["log", &limit, "--pretty=format:%h|%ci|%s"])?;
        Ok(parse_log(&output))
    }
}

/// Parse `git log --pretty=format:%h|%ci|%s` output.
pub fn parse_log(output: &str) -> Vec<CommitSummary> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '|');
            let hash = parts.next()?;
            let date = parts.next()?;
            let message = parts.next()?;
            Some(CommitSummary {
                hash: hash.to_string(),
                date: date.split_whitespace().next().unwrap_or_default().to_string(),
                message: message.to_string(),
            })
        })
        .collect()
}
