//! Writing the merged PDF.
//!
//! Writes are atomic: the document is serialised to a uniquely named
//! temporary file in the destination directory and persisted over the
//! destination only once fully flushed. On any failure the temporary file is
//! dropped, and with it removed, so the destination is either untouched or
//! complete.

use lopdf::Document;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::task;
use tracing::debug;

use crate::error::{Result, SlideCatError};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compress streams before writing.
    pub compress: bool,

    /// Drop unreachable objects and renumber the rest.
    pub optimize: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: true,
            optimize: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Save `doc` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// - [`SlideCatError::FailedToCreateDirectory`] if a parent cannot be created
    /// - [`SlideCatError::FailedToCreateOutput`] if the temporary file cannot be created
    /// - [`SlideCatError::FailedToWrite`] if serialising, flushing or persisting fails
    pub async fn save(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    SlideCatError::FailedToCreateDirectory {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || write_atomic(doc, &parent, &path_buf, &options))
            .await
            .map_err(|e| SlideCatError::other(format!("Write task failed: {e}")))?
    }
}

fn write_atomic(
    mut doc: Document,
    dir: &Path,
    path: &Path,
    options: &WriteOptions,
) -> Result<WriteStatistics> {
    let start = Instant::now();

    if options.optimize {
        doc.prune_objects();
        doc.renumber_objects();
    }
    if options.compress {
        doc.compress();
    }

    let temp = NamedTempFile::new_in(dir).map_err(|e| SlideCatError::FailedToCreateOutput {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let temp_path = temp.path().to_path_buf();
    let mut writer = BufWriter::with_capacity(options.buffer_size, temp);

    doc.save_to(&mut writer)
        .map_err(|e| SlideCatError::FailedToWrite {
            path: temp_path.clone(),
            source: std::io::Error::other(e),
        })?;

    let temp = writer
        .into_inner()
        .map_err(|e| SlideCatError::FailedToWrite {
            path: temp_path,
            source: e.into_error(),
        })?;

    temp.persist(path)
        .map_err(|e| SlideCatError::FailedToWrite {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    debug!(path = %path.display(), size = file_size, "wrote PDF");

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path.to_path_buf(),
    })
}
