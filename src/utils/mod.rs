//! Small helpers shared by the converter, merger and output layers.

use std::path::Path;

/// Longest error excerpt shown on a live progress line.
pub const SNIPPET_LIMIT: usize = 250;

/// Truncate `text` to at most `limit` characters, appending `...` when cut.
///
/// Operates on characters, not bytes, so multi-byte stderr output never
/// splits a code point.
pub fn snippet(text: &str, limit: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// File name of `path` for display, falling back to the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
