//! The interactive convert-then-merge session.
//!
//! 1. Check the converter; without one, offer a merge-only run.
//! 2. Pick the source directory.
//! 3. Pick and convert office files into `<dir>/<subdir>`.
//! 4. Pick, order and merge PDFs into `<dir>/<name>.pdf`.
//! 5. Print a summary.
//!
//! All user interaction goes through a [`Prompter`], so the workflow runs
//! unchanged against a terminal or a scripted fake.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::batch::ProgressObserver;
use crate::config::Config;
use crate::convert::Converter;
use crate::discovery;
use crate::error::{Result, SlideCatError};
use crate::merge::Merger;
use crate::output::{self, OutputFormatter};
use crate::prompt::{Prompter, validate_output_filename};
use crate::utils::display_name;

/// What happened during a session, for the final summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Directory the user chose.
    pub source_dir: PathBuf,

    /// Where converted PDFs go.
    pub conversion_dir: PathBuf,

    /// Files converted, or `None` when conversion was not run at all.
    pub converted: Option<usize>,

    /// Inputs handed to the merger.
    pub files_merged: usize,

    /// Pages in the merged output.
    pub pages_merged: usize,

    /// Merged file, when one was written.
    pub merged_output: Option<PathBuf>,
}

impl SessionSummary {
    fn new(source_dir: &Path, conversion_dir: PathBuf) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            conversion_dir,
            converted: None,
            files_merged: 0,
            pages_merged: 0,
            merged_output: None,
        }
    }
}

/// How a session ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A merged file was written.
    Completed(SessionSummary),

    /// The user chose to stop early, or there was nothing to merge.
    Skipped(SessionSummary),
}

impl SessionOutcome {
    /// The summary, however the session ended.
    pub fn summary(&self) -> &SessionSummary {
        match self {
            Self::Completed(s) | Self::Skipped(s) => s,
        }
    }
}

/// One interactive run.
pub struct Session<'a, P: Prompter> {
    config: &'a Config,
    converter: Option<Converter>,
    merger: Merger,
    prompter: &'a mut P,
    observer: &'a mut dyn ProgressObserver,
    formatter: OutputFormatter,
}

impl<'a, P: Prompter> Session<'a, P> {
    /// Create a session. `converter` is `None` when no office suite was found.
    pub fn new(
        config: &'a Config,
        converter: Option<Converter>,
        prompter: &'a mut P,
        observer: &'a mut dyn ProgressObserver,
        formatter: OutputFormatter,
    ) -> Self {
        Self {
            config,
            converter,
            merger: Merger::new(),
            prompter,
            observer,
            formatter,
        }
    }

    /// Run the whole workflow.
    ///
    /// # Errors
    ///
    /// - [`SlideCatError::Cancelled`] when the user backs out of a prompt or
    ///   declines a merge-only run
    /// - [`SlideCatError::NoPagesMerged`] / [`SlideCatError::MergeFailed`]
    ///   when a merge was attempted and produced nothing
    /// - any whole-operation error, such as an uncreatable output directory
    pub async fn run(&mut self, directory: Option<PathBuf>) -> Result<SessionOutcome> {
        self.banner();

        match &self.converter {
            Some(converter) => self.formatter.success(&format!(
                "Found office converter: {}",
                converter.command().program().display()
            )),
            None => {
                self.converter_missing_hints();
                if !self
                    .prompter
                    .confirm("Proceed with PDF merging only (requires existing PDFs)?", false)?
                {
                    self.formatter.warning("Exiting as requested.");
                    return Err(SlideCatError::Cancelled);
                }
            }
        }

        let source_dir = match directory {
            Some(dir) if dir.is_dir() => dir.canonicalize()?,
            Some(dir) => {
                self.formatter
                    .warning(&format!("Not a directory: {}", dir.display()));
                self.prompter
                    .choose_directory("Directory containing files to process:", Path::new("."))?
            }
            None => self
                .prompter
                .choose_directory("Directory containing files to process:", Path::new("."))?,
        };
        self.formatter
            .info(&format!("Using source directory: {}", source_dir.display()));

        let conversion_dir = self.config.output.conversion_dir(&source_dir);
        let mut summary = SessionSummary::new(&source_dir, conversion_dir.clone());

        let converted = match self.convert_step(&source_dir, &conversion_dir, &mut summary).await? {
            Some(converted) => converted,
            None => return Ok(SessionOutcome::Skipped(summary)),
        };

        self.merge_step(&source_dir, &conversion_dir, converted, summary)
            .await
    }

    fn banner(&self) {
        self.formatter.panel(
            "Welcome!",
            &[
                format!("{} v{}", crate::NAME, crate::VERSION),
                "Convert office presentations to PDF and merge PDFs.".to_string(),
            ],
        );
    }

    fn converter_missing_hints(&self) {
        self.formatter.error(&format!(
            "Office converter not found (looked for: {})",
            self.config.converter.candidates.join(", ")
        ));
        self.formatter
            .info("Install LibreOffice to use the conversion feature:");
        self.formatter
            .info("- sudo apt install libreoffice (Debian/Ubuntu)");
        self.formatter.info("- sudo dnf install libreoffice (Fedora)");
        self.formatter
            .info("- sudo pacman -S libreoffice-still (Arch)");
    }

    /// Conversion stage. `Ok(None)` means the user chose to stop here.
    async fn convert_step(
        &mut self,
        source_dir: &Path,
        conversion_dir: &Path,
        summary: &mut SessionSummary,
    ) -> Result<Option<Vec<PathBuf>>> {
        let Some(converter) = self.converter.clone() else {
            self.formatter
                .warning("Skipping conversion step: no office converter available.");
            return Ok(Some(Vec::new()));
        };

        self.formatter.section("Step 1: Convert office files to PDF");
        let candidates =
            discovery::convertible_files(source_dir, &self.config.converter.extensions);

        if candidates.is_empty() {
            self.formatter
                .warning("No convertible office files found in this directory.");
            if !self
                .prompter
                .confirm("Skip conversion and proceed to merge existing PDFs?", true)?
            {
                return Ok(None);
            }
            summary.converted = Some(0);
            return Ok(Some(Vec::new()));
        }

        let selected = self
            .prompter
            .select_many("Select files to convert to PDF:", &candidates)?;

        if selected.is_empty() {
            self.formatter.warning("No files selected for conversion.");
            summary.converted = Some(0);
            if !self
                .prompter
                .confirm("Proceed to merge existing PDFs?", true)?
            {
                return Ok(None);
            }
            return Ok(Some(Vec::new()));
        }

        self.formatter.info(&format!(
            "Converting {} file(s) into {}",
            selected.len(),
            conversion_dir.display()
        ));
        let report = converter
            .convert(&selected, conversion_dir, &mut *self.observer)
            .await?;
        output::display_conversion_report(&self.formatter, &report, conversion_dir);
        for pdf in &report.successes {
            self.formatter.debug(&format!("Created {}", pdf.display()));
        }

        summary.converted = Some(report.successes.len());
        Ok(Some(report.successes))
    }

    async fn merge_step(
        &mut self,
        source_dir: &Path,
        conversion_dir: &Path,
        converted: Vec<PathBuf>,
        mut summary: SessionSummary,
    ) -> Result<SessionOutcome> {
        self.formatter.section("Step 2: Merge PDF files");

        let scan_dir = discovery::scan_dir(source_dir, conversion_dir);
        self.formatter
            .info(&format!("Scanning for PDFs in: {}", scan_dir.display()));
        let pool = discovery::merge_pool(&converted, &discovery::find_pdfs(&scan_dir));

        if pool.is_empty() {
            self.formatter.warning(&format!(
                "No PDF files found in '{}' to merge.",
                scan_dir.display()
            ));
            return Ok(self.skipped(summary));
        }

        if !self.prompter.confirm(
            &format!("Found {} PDF(s). Select files to merge?", pool.len()),
            true,
        )? {
            self.formatter.info("Skipping merge step as requested.");
            return Ok(self.skipped(summary));
        }

        let selected = self
            .prompter
            .select_many("Select PDF files to merge:", &pool)?;
        if selected.is_empty() {
            self.formatter.warning("No PDF files selected for merging.");
            return Ok(self.skipped(summary));
        }

        let ordered = if selected.len() > 1 {
            self.prompter.choose_order(&selected)?
        } else {
            selected
        };

        self.formatter.info("Files will be merged in this order:");
        for (i, file) in ordered.iter().enumerate() {
            self.formatter.list_item(i + 1, &display_name(file));
        }

        let default_name = self.config.output.default_merge_name(source_dir);
        let name = self.prompter.input_text(
            "Name for the merged PDF file:",
            &default_name,
            &validate_output_filename,
        )?;
        let output_path = source_dir.join(name);

        self.formatter.info(&format!(
            "Merging {} PDF(s) into {}",
            ordered.len(),
            output_path.display()
        ));
        let outcome = self
            .merger
            .merge(&ordered, &output_path, &mut *self.observer)
            .await;
        output::display_merge_report(&self.formatter, &outcome, &output_path);
        for file in &outcome.merged {
            self.formatter.debug(&format!(
                "{}: {} page(s)",
                display_name(&file.path),
                file.pages
            ));
        }

        summary.files_merged = ordered.len();
        if outcome.success {
            summary.pages_merged = outcome.pages_added;
            summary.merged_output = Some(output_path);
        }
        output::display_summary(&self.formatter, &summary);

        outcome.into_result()?;
        info!(pages = summary.pages_merged, "session completed");
        Ok(SessionOutcome::Completed(summary))
    }

    fn skipped(&self, summary: SessionSummary) -> SessionOutcome {
        output::display_summary(&self.formatter, &summary);
        SessionOutcome::Skipped(summary)
    }
}
