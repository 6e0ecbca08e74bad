//! Core PDF merging implementation.
//!
//! Inputs are opened one at a time in the order given. Missing or unreadable
//! files are skipped with a warning; everything else contributes all of its
//! pages to a [`PageAccumulator`]. The output is written once, atomically,
//! and only when at least one page was collected.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::batch::{BatchRunner, ProgressObserver};
use crate::error::{ItemError, Result, SlideCatError};
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::merge::pages::PageAccumulator;
use crate::utils::display_name;

/// One input that made it into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFile {
    /// Source path.
    pub path: PathBuf,

    /// Pages contributed.
    pub pages: usize,
}

/// Result of one merge run.
///
/// `success` is true exactly when `pages_added > 0` and the output was written.
#[derive(Debug)]
pub struct MergeOutcome {
    /// Whether an output file was produced.
    pub success: bool,

    /// Total pages in the output. Zero whenever `success` is false.
    pub pages_added: usize,

    /// Inputs that contributed pages, in merge order.
    pub merged: Vec<MergedFile>,

    /// Inputs that were missing or unreadable, in merge order.
    pub skipped: Vec<ItemError>,

    /// Details of the written file, when there is one.
    pub written: Option<WriteStatistics>,

    /// Whole-merge failure, such as the final write failing.
    pub failure: Option<SlideCatError>,
}

impl MergeOutcome {
    /// Number of inputs that contributed pages.
    pub fn files_merged(&self) -> usize {
        self.merged.len()
    }

    /// Number of inputs that were skipped.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Convert an unsuccessful outcome into the matching error.
    ///
    /// A whole-merge failure becomes [`SlideCatError::MergeFailed`]; an
    /// outcome with no pages becomes [`SlideCatError::NoPagesMerged`].
    pub fn into_result(self) -> Result<Self> {
        if let Some(failure) = &self.failure {
            return Err(SlideCatError::merge_failed(failure.to_string()));
        }
        if !self.success {
            return Err(SlideCatError::NoPagesMerged {
                skipped: self.skipped_count(),
            });
        }
        Ok(self)
    }
}

/// PDF merger that combines multiple documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    reader: PdfReader,
    writer: PdfWriter,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a merger that writes with a custom writer.
    pub fn with_writer(writer: PdfWriter) -> Self {
        Self {
            reader: PdfReader::new(),
            writer,
        }
    }

    /// Merge `files`, in order, into `output`.
    ///
    /// Per-file problems never abort the run. The returned outcome carries
    /// everything a caller needs to report: pages added, contributing files,
    /// skipped files with reasons, and any whole-merge failure. `output` is
    /// created only when the outcome is successful.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use slidecat::batch::NoProgress;
    /// # use slidecat::merge::Merger;
    /// # use std::path::{Path, PathBuf};
    /// # async fn example() {
    /// let files = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
    /// let outcome = Merger::new()
    ///     .merge(&files, Path::new("merged.pdf"), &mut NoProgress)
    ///     .await;
    /// println!("success={} pages={}", outcome.success, outcome.pages_added);
    /// # }
    /// ```
    pub async fn merge(
        &self,
        files: &[PathBuf],
        output: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> MergeOutcome {
        let mut accumulator = PageAccumulator::new();
        let mut runner = BatchRunner::new("Merging", files.len(), observer);

        for file in files {
            runner.begin(&display_name(file));
            let outcome = match self.reader.load(file).await {
                Ok(loaded) => accumulator
                    .append(loaded.document)
                    .map(|pages| MergedFile {
                        path: loaded.path,
                        pages,
                    })
                    .map_err(|e| ItemError::read(file, e.to_string())),
                Err(err) => Err(err),
            };
            runner.record(outcome);
        }

        let report = runner.finish();
        let pages = accumulator.page_count();

        let mut outcome = MergeOutcome {
            success: false,
            pages_added: 0,
            merged: report.successes,
            skipped: report.failures,
            written: None,
            failure: None,
        };

        if pages == 0 {
            info!(
                skipped = outcome.skipped_count(),
                "no pages collected; output not written"
            );
            return outcome;
        }

        match self.writer.save(accumulator.finish(), output).await {
            Ok(stats) => {
                info!(
                    output = %output.display(),
                    pages,
                    files = outcome.files_merged(),
                    skipped = outcome.skipped_count(),
                    "merge written"
                );
                outcome.success = true;
                outcome.pages_added = pages;
                outcome.written = Some(stats);
            }
            Err(err) => {
                error!(output = %output.display(), collected_pages = pages, "merge failed: {err}");
                outcome.failure = Some(err);
            }
        }

        outcome
    }
}
