//! Opening PDFs for merging.
//!
//! Loading is lenient: lopdf tolerates many structural deviations, and any
//! failure it still reports becomes an [`ItemError`] for that one file. The
//! file is read fully into memory before parsing, so no handle outlives
//! [`PdfReader::load`] on any path.
//!
//! # Examples
//!
//! ```no_run
//! use slidecat::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() {
//! let reader = PdfReader::new();
//! match reader.load(Path::new("document.pdf")).await {
//!     Ok(loaded) => println!("{} pages", loaded.document.get_pages().len()),
//!     Err(e) => eprintln!("skipped: {e}"),
//! }
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::error::ItemError;

/// A loaded PDF document with at least one page.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document, already decrypted when it had an empty user password.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,
}

/// Opens PDF files one at a time.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// - [`ItemError::NotFound`] if `path` is not an existing file
    /// - [`ItemError::Read`] if the file cannot be read, does not parse, needs
    ///   a user password, or has no pages
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf, ItemError> {
        if !path.is_file() {
            return Err(ItemError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || load_blocking(path_buf))
            .await
            .map_err(|e| ItemError::Unexpected {
                path: path.to_path_buf(),
                category: "TaskJoin".to_string(),
                message: e.to_string(),
            })?
    }
}

fn load_blocking(path: PathBuf) -> Result<LoadedPdf, ItemError> {
    let bytes = std::fs::read(&path).map_err(|e| ItemError::read(&path, e.to_string()))?;
    let document = Document::load_mem(&bytes).map_err(|e| ItemError::read(&path, e.to_string()))?;

    // lopdf decrypts empty-user-password files while loading and records the
    // state; `/Encrypt` stays in the trailer either way.
    if document.is_encrypted() && document.encryption_state.is_none() {
        return Err(ItemError::read(&path, "PDF is encrypted and needs a password"));
    }

    if document.get_pages().is_empty() {
        return Err(ItemError::read(&path, "PDF has no pages"));
    }

    Ok(LoadedPdf { document, path })
}
