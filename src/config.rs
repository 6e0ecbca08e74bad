//! Configuration module for slidecat.
//!
//! Settings come from three layers, later layers winning:
//! - built-in defaults
//! - an optional TOML file (`slidecat.toml`)
//! - command-line flags
//!
//! The resolved converter executable is not stored globally. It is looked up
//! once with [`ConverterCommand::resolve`] and handed to the converter.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SlideCatError};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "slidecat.toml";

/// Per-file conversion time budget used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Settings for the external office converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Executable names probed on `PATH`, in order.
    pub candidates: Vec<String>,

    /// Explicit executable; skips probing when set.
    pub command: Option<PathBuf>,

    /// Time budget per converted file.
    pub timeout_seconds: u64,

    /// Source extensions offered for conversion (lowercase, with leading dot).
    pub extensions: Vec<String>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            candidates: vec!["soffice".to_string(), "libreoffice".to_string()],
            command: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            extensions: [".pptx", ".ppt", ".odp", ".ppsx", ".pps"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ConverterSettings {
    /// Time budget as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Check whether a path has one of the convertible extensions.
    ///
    /// Comparison is case-insensitive.
    pub fn is_convertible(&self, path: &Path) -> bool {
        crate::discovery::has_extension(path, &self.extensions)
    }
}

/// Where produced files land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Subdirectory of the source directory that receives converted PDFs.
    pub subdir: String,

    /// Suffix appended to the source directory name for the default merge name.
    pub merged_suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            subdir: "converted_pdfs".to_string(),
            merged_suffix: "_merged.pdf".to_string(),
        }
    }
}

impl OutputSettings {
    /// Conversion output directory for a given source directory.
    pub fn conversion_dir(&self, source_dir: &Path) -> PathBuf {
        source_dir.join(&self.subdir)
    }

    /// Suggested merge output file name for a given source directory.
    pub fn default_merge_name(&self, source_dir: &Path) -> String {
        let stem = source_dir
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or("output");
        format!("{stem}{}", self.merged_suffix)
    }
}

/// Diagnostic logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,

    /// Emit JSON lines instead of human-readable logs.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Complete configuration for a slidecat run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External converter settings.
    pub converter: ConverterSettings,

    /// Output locations.
    pub output: OutputSettings,

    /// Diagnostic logging.
    pub logging: LoggingSettings,

    /// Suppress non-error output.
    #[serde(skip)]
    pub quiet: bool,

    /// Show verbose output.
    #[serde(skip)]
    pub verbose: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing config: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = toml::from_str(raw)?;
        Ok(cfg)
    }

    /// Load the explicit config file, or `./slidecat.toml` if present, or defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Ok(Self::load(path)?),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Ok(Self::load(fallback)?)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The timeout is zero
    /// - No converter candidates are listed and no explicit command is set
    /// - An extension lacks its leading dot
    /// - The conversion subdirectory is empty
    /// - Verbose and quiet modes are both enabled
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.converter.timeout_seconds == 0 {
            bail!("Converter timeout must be at least 1 second");
        }

        if self.converter.candidates.is_empty() && self.converter.command.is_none() {
            bail!("No converter candidates configured");
        }

        if let Some(ext) = self
            .converter
            .extensions
            .iter()
            .find(|e| !e.starts_with('.') || e.len() < 2)
        {
            bail!("Invalid extension '{ext}': extensions must look like '.pptx'");
        }

        if self.output.subdir.trim().is_empty() {
            bail!("Conversion output subdirectory cannot be empty");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        Ok(())
    }

    /// Check if regular output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }
}

/// The converter executable, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterCommand {
    program: PathBuf,
}

impl ConverterCommand {
    /// Wrap an already-known executable path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the converter against the process `PATH`.
    pub fn resolve(settings: &ConverterSettings) -> Result<Self> {
        let search_path = std::env::var_os("PATH").unwrap_or_default();
        Self::resolve_in(settings, &search_path)
    }

    /// Resolve the converter against an explicit search path.
    ///
    /// An explicit `command` wins over the candidate list. Otherwise the
    /// candidates are probed in order and the first hit is returned.
    pub fn resolve_in(settings: &ConverterSettings, search_path: &OsStr) -> Result<Self> {
        if let Some(command) = &settings.command {
            return find_executable(command, search_path)
                .map(Self::new)
                .ok_or_else(|| SlideCatError::ConverterNotFound {
                    candidates: vec![command.display().to_string()],
                });
        }

        settings
            .candidates
            .iter()
            .find_map(|name| find_executable(Path::new(name), search_path))
            .map(Self::new)
            .ok_or_else(|| SlideCatError::ConverterNotFound {
                candidates: settings.candidates.clone(),
            })
    }

    /// Path of the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Locate an executable by name on a `PATH`-style search path.
///
/// Names containing a path separator are checked directly.
fn find_executable(name: &Path, search_path: &OsStr) -> Option<PathBuf> {
    if name.components().count() > 1 {
        return is_executable(name).then(|| name.to_path_buf());
    }

    std::env::split_paths(search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
