//! JSON release metadata: the archive manifest and `version_info.json`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::git::GitInfo;
use crate::patches::EntityChangeSet;

/// Bundle manifest read by PrusaSlicer's configuration wizard.
///
/// Field order is the serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub visibility: String,
    pub id: String,
    pub url: String,
    pub index_url: String,
    pub offline_archive_url: String,
}

const REPOSITORY_URL: &str =
    "https://github.com/Smartbox-Assistive-Technology/PrusaSlicer-settings-prusa-fff";

impl Default for Manifest {
    fn default() -> Self {
        Self {
            name: "Prusa FFF Smartbox".to_string(),
            description: "Smartbox custom Prusa FFF bundle".to_string(),
            visibility: String::new(),
            id: "prusa-fff".to_string(),
            url: REPOSITORY_URL.to_string(),
            index_url: format!("{}/releases/latest/download/vendor_indices.zip", REPOSITORY_URL),
            offline_archive_url: format!(
                "{}/releases/latest/download/prusa-fff-offline.zip",
                REPOSITORY_URL
            ),
        }
    }
}

impl Manifest {
    /// Compact JSON, no whitespace between tokens.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Contents of `version_info.json`
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo<'a> {
    pub version: String,
    pub release_notes: &'a str,
    pub filaments: &'a EntityChangeSet,
    pub prusa_base_version: String,
    pub git_info: Option<&'a GitInfo>,
}

impl VersionInfo<'_> {
    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
