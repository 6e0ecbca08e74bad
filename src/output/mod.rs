//! Output formatting and display for slidecat.
//!
//! This module handles all user-facing output:
//! - status messages through [`OutputFormatter`]
//! - live batch progress through [`ProgressBar`]
//! - end-of-stage reports and the final summary panel
//! - JSON reports for scripted use

pub mod formatter;
pub mod progress;
pub mod report;

pub use formatter::{MessageLevel, OutputFormatter, render_panel};
pub use progress::ProgressBar;
pub use report::{ConversionReport, FailureEntry, MergeReport};

use std::path::{Path, PathBuf};

use crate::batch::BatchReport;
use crate::merge::MergeOutcome;
use crate::session::SessionSummary;
use crate::utils::{SNIPPET_LIMIT, display_name, snippet};

/// Report a finished conversion batch.
pub fn display_conversion_report(
    formatter: &OutputFormatter,
    report: &BatchReport<PathBuf>,
    outdir: &Path,
) {
    if !report.failures.is_empty() {
        formatter.warning(&format!(
            "Conversion failed for {} file(s):",
            report.failures.len()
        ));
        for (path, message) in report.failure_messages() {
            formatter.warning(&format!(
                "  - {}: {}",
                display_name(path),
                snippet(&message, SNIPPET_LIMIT)
            ));
        }
    }

    if !report.successes.is_empty() {
        formatter.success(&format!(
            "Converted {} file(s) to PDF in {}",
            report.successes.len(),
            outdir.display()
        ));
    } else if report.failures.is_empty() {
        formatter.info("No files were converted.");
    }
}

/// Report a finished merge.
pub fn display_merge_report(formatter: &OutputFormatter, outcome: &MergeOutcome, output: &Path) {
    if !outcome.skipped.is_empty() {
        formatter.warning(&format!("Skipped {} file(s):", outcome.skipped_count()));
        for skipped in &outcome.skipped {
            formatter.warning(&format!("  - {skipped}"));
        }
    }

    if outcome.success {
        let size = outcome
            .written
            .as_ref()
            .map(|s| format!(", {}", s.format_file_size()))
            .unwrap_or_default();
        formatter.success(&format!(
            "Merged {} file(s), {} page(s) into {}{size}",
            outcome.files_merged(),
            outcome.pages_added,
            output.display()
        ));
    } else if let Some(failure) = &outcome.failure {
        formatter.error(&format!("Failed to merge PDFs: {failure}"));
    } else {
        formatter.error("No valid PDF pages could be added. Output file not created.");
    }
}

/// Lines of the final summary panel.
pub fn summary_lines(summary: &SessionSummary) -> Vec<String> {
    let mut lines = vec![format!("Source Directory: {}", summary.source_dir.display())];

    match summary.converted {
        Some(count) => {
            lines.push(format!(
                "Conversion Output: {}",
                summary.conversion_dir.display()
            ));
            lines.push(format!("Files Converted: {count}"));
        }
        None => lines.push("Conversion step skipped.".to_string()),
    }

    lines.push(String::new());
    match &summary.merged_output {
        Some(output) => {
            lines.push(format!("Files Merged: {}", summary.files_merged));
            lines.push(format!("Total Pages Merged: {}", summary.pages_merged));
            lines.push(format!("Merged Output File: {}", output.display()));
        }
        None => lines.push("Merging step skipped or failed.".to_string()),
    }

    lines
}

/// Print the final summary panel.
pub fn display_summary(formatter: &OutputFormatter, summary: &SessionSummary) {
    formatter.blank_line();
    formatter.panel("Finished", &summary_lines(summary));
}
