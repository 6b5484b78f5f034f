//! Phase 6: Writing to Disk
//!
//! The final phase of a build. It writes the staged output filesystem to the
//! output directory.
//!
//! ## Process
//!
//! 1.  **Iterate Files**: The staged files are visited in path order.
//!
//! 2.  **Create Directories**: For each file, any missing parent directories
//!     are created.
//!
//! 3.  **Write Content**: The file content is written, replacing an existing
//!     file of the same name. Files already in the output directory that were
//!     not staged are left alone.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

/// Execute Phase 6: Write the staged files to disk
pub fn execute(staged: &MemoryFS, output_path: &Path) -> Result<()> {
    for (relative_path, file) in staged.files() {
        let full_path = output_path.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        fs::write(&full_path, &file.content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", full_path.display(), e),
        })?;
        debug!("Wrote {} ({} bytes)", full_path.display(), file.size());
    }

    info!("Wrote {} files to {}", staged.len(), output_path.display());
    Ok(())
}
