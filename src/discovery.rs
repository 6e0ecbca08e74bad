//! Locating candidate files in a directory.
//!
//! Discovery is shallow: only regular files directly inside the
//! given directory are considered, and results are always sorted so that
//! listings and prompts are deterministic.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Regular files directly in `dir` matching `accept`, sorted by path.
///
/// Unreadable entries are skipped. A path that is not a directory yields an
/// empty list.
fn files_in<F>(dir: &Path, accept: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(dir = %dir.display(), "skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| accept(path))
        .collect();

    files.sort();
    files
}

/// Whether `path` ends in one of `extensions` (leading dot, any case).
pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(OsStr::to_str) {
        Some(ext) => {
            let dotted = format!(".{}", ext.to_lowercase());
            extensions.iter().any(|e| e.eq_ignore_ascii_case(&dotted))
        }
        None => false,
    }
}

/// Source documents in `dir` whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively and carry a leading dot.
pub fn convertible_files(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    files_in(dir, |path| has_extension(path, extensions))
}

/// PDF files in `dir` (`.pdf`, any case).
pub fn find_pdfs(dir: &Path) -> Vec<PathBuf> {
    let pdf = [".pdf".to_string()];
    files_in(dir, |path| has_extension(path, &pdf))
}

/// Directory to scan for merge candidates.
///
/// The conversion output directory wins when it exists and holds at least one
/// entry; otherwise the source directory is used.
pub fn scan_dir(source: &Path, conversion_out: &Path) -> PathBuf {
    let populated = std::fs::read_dir(conversion_out)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);

    if populated {
        conversion_out.to_path_buf()
    } else {
        source.to_path_buf()
    }
}

/// Union of freshly converted and scanned PDFs, without duplicates, sorted by
/// file name.
pub fn merge_pool(converted: &[PathBuf], scanned: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut pool: Vec<PathBuf> = converted
        .iter()
        .chain(scanned)
        .filter(|path| seen.insert(normalize(path)))
        .cloned()
        .collect();

    pool.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    pool
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
