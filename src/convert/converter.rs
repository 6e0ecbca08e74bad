//! Invoking the external office suite to turn documents into PDFs.
//!
//! # Examples
//!
//! ```no_run
//! use slidecat::batch::NoProgress;
//! use slidecat::config::{ConverterCommand, ConverterSettings};
//! use slidecat::convert::Converter;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> slidecat::Result<()> {
//! let settings = ConverterSettings::default();
//! let converter = Converter::new(ConverterCommand::resolve(&settings)?, settings.timeout());
//! let files = vec![PathBuf::from("talk.pptx")];
//! let report = converter
//!     .convert(&files, Path::new("converted_pdfs"), &mut NoProgress)
//!     .await?;
//! println!("{} converted, {} failed", report.successes.len(), report.failures.len());
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::batch::{BatchReport, BatchRunner, ProgressObserver};
use crate::config::ConverterCommand;
use crate::error::{ItemError, Result, SlideCatError, ToolFailure};
use crate::utils::display_name;

/// Result of converting one file: the produced PDF or the reason it failed.
pub type ConversionOutcome = std::result::Result<PathBuf, ItemError>;

/// Runs one headless conversion per input file.
#[derive(Debug, Clone)]
pub struct Converter {
    command: ConverterCommand,
    timeout: Duration,
}

impl Converter {
    /// Create a converter around an already resolved executable.
    pub fn new(command: ConverterCommand, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    /// The executable this converter runs.
    pub fn command(&self) -> &ConverterCommand {
        &self.command
    }

    /// Per-file time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full argv (program first) used to convert `input` into `outdir`.
    pub fn command_line(&self, input: &Path, outdir: &Path) -> Vec<OsString> {
        vec![
            self.command.program().as_os_str().to_owned(),
            OsString::from("--headless"),
            OsString::from("--convert-to"),
            OsString::from("pdf"),
            OsString::from("--outdir"),
            absolute(outdir).into_os_string(),
            absolute(input).into_os_string(),
        ]
    }

    /// Where the converter is expected to write the PDF for `input`.
    pub fn expected_output(input: &Path, outdir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        outdir.join(format!("{stem}.pdf"))
    }

    /// Convert every file in order, isolating per-file failures.
    ///
    /// `outdir` (and its parents) is created first. Failing to create it is
    /// the only error that stops the batch before any file is attempted.
    pub async fn convert(
        &self,
        files: &[PathBuf],
        outdir: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<BatchReport<PathBuf>> {
        tokio::fs::create_dir_all(outdir)
            .await
            .map_err(|source| SlideCatError::FailedToCreateDirectory {
                path: outdir.to_path_buf(),
                source,
            })?;

        let mut runner = BatchRunner::new("Converting", files.len(), observer);
        for file in files {
            runner.begin(&display_name(file));
            let outcome = self.convert_one(file, outdir).await;
            runner.record(outcome);
        }

        let report = runner.finish();
        info!(
            converted = report.successes.len(),
            failed = report.failures.len(),
            "conversion batch finished"
        );
        Ok(report)
    }

    /// Convert a single file into `outdir`, which must already exist.
    pub async fn convert_one(&self, input: &Path, outdir: &Path) -> ConversionOutcome {
        let argv = self.command_line(input, outdir);
        let expected = Self::expected_output(input, outdir);
        debug!(input = %input.display(), ?argv, "invoking converter");

        let child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ItemError::CommandVanished {
                    command: self.command.program().to_path_buf(),
                    path: input.to_path_buf(),
                });
            }
            Err(err) => return Err(ItemError::unexpected_io(input, &err)),
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => return Err(ItemError::unexpected_io(input, &err)),
            Err(_) => {
                return Err(ItemError::Timeout {
                    path: input.to_path_buf(),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let produced = classify(input, output.status.code(), &stderr, &expected)?;
        debug!(output = %produced.display(), "converted");
        Ok(produced)
    }
}

/// Decide the outcome of a finished converter run.
///
/// Checks run in a fixed order: a non-zero (or missing) exit code, then the
/// word "error" anywhere in stderr, then whether `expected` exists on disk.
/// The stderr check is a weak signal and can misfire on harmless messages.
pub fn classify(
    input: &Path,
    exit_code: Option<i32>,
    stderr: &str,
    expected: &Path,
) -> ConversionOutcome {
    let failure = if exit_code != Some(0) {
        Some(ToolFailure::ExitCode {
            code: exit_code,
            stderr: stderr.trim().to_string(),
        })
    } else if stderr.to_lowercase().contains("error") {
        Some(ToolFailure::ReportedError {
            stderr: stderr.trim().to_string(),
        })
    } else if !expected.exists() {
        Some(ToolFailure::MissingOutput {
            expected: expected.to_path_buf(),
        })
    } else {
        None
    };

    match failure {
        Some(failure) => Err(ItemError::ExternalTool {
            path: input.to_path_buf(),
            failure,
        }),
        None => Ok(expected.to_path_buf()),
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
