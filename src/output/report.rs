//! Machine-readable batch reports for `--json`.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::batch::BatchReport;
use crate::error::{ItemError, ItemErrorKind};
use crate::merge::MergeOutcome;

/// One failed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    /// The item that failed.
    pub path: PathBuf,
    /// Failure category.
    pub kind: ItemErrorKind,
    /// Full failure message.
    pub message: String,
}

impl From<&ItemError> for FailureEntry {
    fn from(err: &ItemError) -> Self {
        Self {
            path: err.path().to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a conversion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Directory that received the PDFs.
    pub outdir: PathBuf,
    /// Produced PDFs, in input order.
    pub converted: Vec<PathBuf>,
    /// Inputs that failed.
    pub failed: Vec<FailureEntry>,
}

impl ConversionReport {
    /// Build from a finished conversion batch.
    pub fn new(outdir: &Path, report: &BatchReport<PathBuf>) -> Self {
        Self {
            outdir: outdir.to_path_buf(),
            converted: report.successes.clone(),
            failed: report.failures.iter().map(FailureEntry::from).collect(),
        }
    }
}

/// Per-file entry of a merge report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedEntry {
    /// Input path.
    pub path: PathBuf,
    /// Pages contributed.
    pub pages: usize,
}

/// Outcome of a merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Whether the output was written.
    pub success: bool,
    /// Requested output path.
    pub output: PathBuf,
    /// Pages in the output.
    pub pages_added: usize,
    /// Inputs that contributed pages.
    pub merged: Vec<MergedEntry>,
    /// Inputs that were skipped.
    pub skipped: Vec<FailureEntry>,
    /// Whole-merge failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MergeReport {
    /// Build from a merge outcome.
    pub fn new(output: &Path, outcome: &MergeOutcome) -> Self {
        Self {
            success: outcome.success,
            output: output.to_path_buf(),
            pages_added: outcome.pages_added,
            merged: outcome
                .merged
                .iter()
                .map(|m| MergedEntry {
                    path: m.path.clone(),
                    pages: m.pages,
                })
                .collect(),
            skipped: outcome.skipped.iter().map(FailureEntry::from).collect(),
            error: outcome.failure.as_ref().map(ToString::to_string),
        }
    }
}
