//! Error types for slidecat.
//!
//! Two layers of errors exist:
//!
//! - [`SlideCatError`]: whole-operation failures. These stop the current
//!   stage (a missing converter, an unwritable output, a cancelled prompt).
//! - [`ItemError`]: failures attributable to a single file inside a batch.
//!   These are recorded and reported, and the batch continues.
//!
//! # Error Categories
//!
//! - **Precondition**: the external converter cannot be located
//! - **Per-item conversion**: bad exit code, reported error text, missing output, timeout
//! - **Per-item merge**: missing file, unreadable PDF
//! - **Whole-batch merge**: no pages added, or the final write failed
//! - **Cancellation**: the user backed out of an interactive step

use std::io;
use std::path::{Path, PathBuf};

/// Result type alias for slidecat operations.
pub type Result<T> = std::result::Result<T, SlideCatError>;

/// Main error type for slidecat operations.
#[derive(Debug, thiserror::Error)]
pub enum SlideCatError {
    /// None of the converter candidates could be found.
    #[error(
        "Office converter not found (looked for: {})\n  \
         Hint: install LibreOffice and make sure 'soffice' is on your PATH",
        .candidates.join(", ")
    )]
    ConverterNotFound {
        /// Executable names that were probed.
        candidates: Vec<String>,
    },

    /// A directory needed for output could not be created.
    #[error("Failed to create directory: {}\n  Reason: {source}", .path.display())]
    FailedToCreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Merge operation failed as a whole.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Every input was missing or unreadable, so no output was produced.
    #[error("No valid PDF pages could be added ({skipped} file(s) skipped); output file not created")]
    NoPagesMerged {
        /// Number of inputs that were skipped.
        skipped: usize,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for SlideCatError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for SlideCatError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl SlideCatError {
    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    ///
    /// `1` means the user aborted or the merge produced nothing, `2` is
    /// reserved for everything unexpected.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 1,
            Self::NoPagesMerged { .. } => 1,
            Self::MergeFailed { .. } => 1,
            _ => 2,
        }
    }
}

/// Coarse category of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemErrorKind {
    /// An input file or the converter executable was not found.
    NotFound,
    /// The converter exceeded its time budget.
    Timeout,
    /// The converter ran but did not produce a usable result.
    ExternalToolError,
    /// A PDF could not be opened or parsed.
    ReadError,
    /// Anything else.
    UnexpectedError,
}

/// How the external converter signalled failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    /// Non-zero exit status.
    ExitCode {
        /// Exit code, `None` when the process was terminated by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// Exit status zero, but standard error mentions "error".
    ReportedError {
        /// Captured standard error.
        stderr: String,
    },
    /// Exit status zero and quiet, but no output file appeared.
    MissingOutput {
        /// Where the PDF was expected.
        expected: PathBuf,
    },
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExitCode { code, stderr } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                let stderr = if stderr.trim().is_empty() {
                    "N/A"
                } else {
                    stderr.trim()
                };
                write!(f, "converter exited with code {code}. Stderr: {stderr}")
            }
            Self::ReportedError { stderr } => {
                write!(f, "converter reported an error. Stderr: {}", stderr.trim())
            }
            Self::MissingOutput { expected } => write!(
                f,
                "conversion finished but output PDF was not found: {}",
                expected.display()
            ),
        }
    }
}

/// A failure confined to one item of a batch.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// The input file does not exist.
    #[error("File not found: {}", .path.display())]
    NotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// The converter disappeared between startup and this invocation.
    #[error("'{}' command not found during execution", .command.display())]
    CommandVanished {
        /// Converter executable that could not be spawned.
        command: PathBuf,
        /// Input that was being converted.
        path: PathBuf,
    },

    /// The converter did not finish in time.
    #[error("Conversion timed out after {seconds} seconds: {}", .path.display())]
    Timeout {
        /// Input being converted.
        path: PathBuf,
        /// Time budget in seconds.
        seconds: u64,
    },

    /// The converter ran but failed.
    #[error("Failed to convert {}: {failure}", .path.display())]
    ExternalTool {
        /// Input being converted.
        path: PathBuf,
        /// How the failure was detected.
        failure: ToolFailure,
    },

    /// The file could not be read as a PDF.
    #[error("Error reading {}: {reason}", .path.display())]
    Read {
        /// Unreadable file.
        path: PathBuf,
        /// Parser or I/O message.
        reason: String,
    },

    /// Anything not covered above.
    #[error("Unexpected error on {}: {category}: {message}", .path.display())]
    Unexpected {
        /// File being processed.
        path: PathBuf,
        /// Error category, e.g. the `io::ErrorKind`.
        category: String,
        /// Error message.
        message: String,
    },
}

impl ItemError {
    /// Coarse category, for callers that want to branch on the failure type.
    pub fn kind(&self) -> ItemErrorKind {
        match self {
            Self::NotFound { .. } | Self::CommandVanished { .. } => ItemErrorKind::NotFound,
            Self::Timeout { .. } => ItemErrorKind::Timeout,
            Self::ExternalTool { .. } => ItemErrorKind::ExternalToolError,
            Self::Read { .. } => ItemErrorKind::ReadError,
            Self::Unexpected { .. } => ItemErrorKind::UnexpectedError,
        }
    }

    /// The item this failure belongs to.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::CommandVanished { path, .. }
            | Self::Timeout { path, .. }
            | Self::ExternalTool { path, .. }
            | Self::Read { path, .. }
            | Self::Unexpected { path, .. } => path,
        }
    }

    /// Whether the failure likely affects every remaining item too.
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::CommandVanished { .. })
    }

    /// Create a Read error.
    pub fn read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Unexpected error from an I/O error.
    pub fn unexpected_io(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        Self::Unexpected {
            path: path.into(),
            category: format!("{:?}", err.kind()),
            message: err.to_string(),
        }
    }
}
