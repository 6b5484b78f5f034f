//! `config_version` stamping.

use regex::{NoExpand, Regex};

use crate::error::{Error, Result};

const CONFIG_VERSION_PATTERN: &str = r"(?m)^[ \t]*config_version[ \t]*=.*$";

/// Rewrite the first `config_version = ...` line to `config_version = <version>`.
///
/// Returns the byte offset of the rewritten line, or `None` when the document
/// has no such line, together with the resulting text. Later occurrences are
/// left alone.
pub fn stamp_config_version(text: &str, version: &str) -> Result<(Option<usize>, String)> {
    let regex = Regex::new(CONFIG_VERSION_PATTERN).map_err(Error::Regex)?;
    let offset = regex.find(text).map(|m| m.start());
    let line = format!("config_version = {}", version);
    let stamped = regex.replace(text, NoExpand(&line)).into_owned();
    Ok((offset, stamped))
}
