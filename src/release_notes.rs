//! Markdown release notes.

use crate::git::CommitSummary;
use crate::patches::EntityChangeSet;
use crate::version::LineageVersion;

/// Number of commits queried for the notes
pub const COMMITS_QUERIED: usize = 5;
/// Number of commits rendered
pub const COMMITS_SHOWN: usize = 3;

/// Everything the release notes mention
#[derive(Debug, Clone)]
pub struct ReleaseContext<'a> {
    /// Bundle name, e.g. "Smartbox"
    pub name: &'a str,
    pub organization: &'a str,
    pub vendor_label: &'a str,
    pub version: &'a LineageVersion,
    pub base: &'a LineageVersion,
    pub min_slicer_version: &'a str,
    pub offline_archive: &'a str,
    /// File name of the merged document for manual installs
    pub compat_ini: &'a str,
    pub changes: &'a EntityChangeSet,
    pub commits: &'a [CommitSummary],
}

/// Render the notes. The text has no trailing newline.
pub fn render(ctx: &ReleaseContext<'_>) -> String {
    let mut notes: Vec<String> = vec![
        format!(
            "# {} PrusaSlicer Configuration Bundle v{}",
            ctx.name, ctx.version
        ),
        String::new(),
        format!(
            "This release contains custom filament profiles for {},",
            ctx.organization
        ),
        format!(
            "based on the {} configuration bundle v{}.",
            ctx.vendor_label, ctx.base
        ),
        String::new(),
    ];

    let changes = ctx.changes;
    if !changes.is_empty() {
        notes.push("## 🧵 Filament Changes".to_string());
        notes.push(String::new());
        section(&mut notes, "### ✅ Added Filaments", &changes.added, "");
        section(
            &mut notes,
            "### 🔄 Updated Filaments",
            &changes.replaced,
            " (improved profile)",
        );
        section(&mut notes, "### ❌ Removed Filaments", &changes.removed, "");
    }

    let shipped = changes.shipped();
    if !shipped.is_empty() {
        notes.push(format!("### 📋 All {} Filaments", ctx.name));
        notes.extend(shipped.iter().map(|name| format!("- **{}**", name)));
        notes.push(String::new());
    }

    if !ctx.commits.is_empty() {
        notes.push("## 📝 Recent Changes".to_string());
        notes.push(String::new());
        notes.extend(
            ctx.commits
                .iter()
                .take(COMMITS_SHOWN)
                .map(|c| format!("- {} ({})", c.message, c.hash)),
        );
        notes.push(String::new());
    }

    notes.extend([
        "## 📦 Installation".to_string(),
        String::new(),
        "### Using Configuration Assistant (Recommended)".to_string(),
        format!("1. Download `{}` from this release", ctx.offline_archive),
        "2. Open PrusaSlicer".to_string(),
        "3. Go to **Configuration** → **Configuration Assistant**".to_string(),
        "4. Click **Next** until you reach **Configuration sources**".to_string(),
        format!("5. **Untick** the {} FFF online source", ctx.vendor_label),
        "6. Click **Load** and select the downloaded zip file".to_string(),
        "7. Complete the setup".to_string(),
        String::new(),
        "### Manual Installation".to_string(),
        format!(
            "- Download `{}` and replace the file in your PrusaSlicer vendor folder",
            ctx.compat_ini
        ),
        String::new(),
        "## 🔧 Technical Details".to_string(),
        String::new(),
        format!("- **Base Version**: {} {}", ctx.vendor_label, ctx.base),
        format!("- **Minimum PrusaSlicer**: {}", ctx.min_slicer_version),
        format!("- **Bundle Version**: {}", ctx.version),
        String::new(),
        "---".to_string(),
        format!("*Generated automatically by {} CI*", ctx.name),
    ]);

    notes.join("\n")
}

fn section(
    notes: &mut Vec<String>,
    heading: &str,
    names: &std::collections::BTreeSet<String>,
    suffix: &str,
) {
    if names.is_empty() {
        return;
    }
    notes.push(heading.to_string());
    notes.extend(names.iter().map(|name| format!("- **{}**{}", name, suffix)));
    notes.push(String::new());
}
