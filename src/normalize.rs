//! Comment stripping for vendor configuration text.
//!
//! The vendor bundle uses `#` for comments, but colour definitions such as
//! `filament_colour = #3EC0FF` use the same character for their values. Lines
//! mentioning "colour" are therefore kept whole, and a `#` directly preceded by
//! a backslash is treated as literal text.
//!
//! Blank lines survive normalization so that line-based diffs between the base
//! document and patch fragments stay aligned.

const COLOUR_MARKER: &str = "colour";

/// Strip comments and trailing whitespace from every line of `text`.
///
/// The text is split on `\n` and re-joined with `\n`, so line terminators
/// (including a final one) are kept and `\r\n` collapses to `\n`. Splitting
/// and joining are inverses, which makes the function idempotent.
pub fn normalize(text: &str) -> String {
    text.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize a single line (no line terminator).
pub fn normalize_line(line: &str) -> &str {
    if line.to_lowercase().contains(COLOUR_MARKER) {
        return line.trim_end();
    }

    match comment_start(line) {
        Some(pos) => line[..pos].trim_end(),
        None => line.trim_end(),
    }
}

/// Byte offset of the first `#` not immediately preceded by a backslash.
fn comment_start(line: &str) -> Option<usize> {
    let mut previous = None;
    for (pos, ch) in line.char_indices() {
        if ch == '#' && previous != Some('\\') {
            return Some(pos);
        }
        previous = Some(ch);
    }
    None
}
