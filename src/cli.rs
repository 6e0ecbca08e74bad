//! CLI argument parsing for slidecat.
//!
//! This module defines the command-line interface using `clap` derive and
//! folds the flags over the file configuration. Running `slidecat` with no
//! subcommand starts the interactive session.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use slidecat::cli::Cli;
//!
//! let cli = Cli::parse();
//! let config = cli.to_config().expect("invalid configuration");
//! println!("timeout: {}s", config.converter.timeout_seconds);
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, LoggingSettings};
use crate::discovery;
use crate::error::{Result, SlideCatError};

/// Convert presentations to PDF and merge PDFs into one document.
///
/// slidecat drives a headless LibreOffice to turn slide decks into PDFs,
/// then concatenates a chosen, ordered set of PDFs. One broken file never
/// stops a batch: it is reported and the rest carry on.
#[derive(Parser, Debug)]
#[command(name = "slidecat")]
#[command(version)]
#[command(about = "Convert presentations to PDF and merge them", long_about = None)]
#[command(author)]
pub struct Cli {
    /// Path to a config TOML. If omitted, uses ./slidecat.toml if present.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the log filter (trace/debug/info/warn/error).
    ///
    /// `RUST_LOG` still wins when it is set.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show per-file details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Office converter executable to use instead of probing PATH
    #[arg(long, global = true, value_name = "PATH", env = "SLIDECAT_CONVERTER")]
    pub converter: Option<PathBuf>,

    /// Seconds allowed per file conversion
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Name of the directory converted PDFs are written to
    #[arg(long, global = true, value_name = "NAME")]
    pub output_subdir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Guided convert-then-merge session (the default).
    Interactive {
        /// Directory holding the presentations. Prompted for when omitted.
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Convert presentations to PDF without prompting.
    ///
    /// Directories are expanded to the convertible files directly inside them.
    Convert {
        /// Presentation files or directories
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<PathBuf>,

        /// Directory the PDFs are written to.
        ///
        /// Defaults to the output subdirectory of the current directory.
        #[arg(long, value_name = "DIR")]
        outdir: Option<PathBuf>,

        /// Print a JSON report on stdout
        #[arg(long)]
        json: bool,
    },

    /// Merge PDFs in the given order without prompting.
    Merge {
        /// PDF files, merged in the order given
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<PathBuf>,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Print a JSON report on stdout
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Load the configuration file and apply the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SlideCatError::InvalidConfig`] if the config file cannot be
    /// read or the merged settings fail validation.
    pub fn to_config(&self) -> Result<Config> {
        let mut config = Config::discover(self.config.as_deref())
            .map_err(|err| SlideCatError::invalid_config(err.to_string()))?;

        if let Some(converter) = &self.converter {
            config.converter.command = Some(converter.clone());
        }
        if let Some(timeout) = self.timeout {
            config.converter.timeout_seconds = timeout;
        }
        if let Some(subdir) = &self.output_subdir {
            config.output.subdir = subdir.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        config.quiet = self.quiet;
        config.verbose = self.verbose;

        config
            .validate()
            .map_err(|err| SlideCatError::invalid_config(format!("{err:#}")))?;

        Ok(config)
    }

    /// The subcommand to run, defaulting to the interactive session.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Interactive { dir: None })
    }
}

impl Command {
    /// Whether a machine-readable report was requested.
    pub fn wants_json(&self) -> bool {
        match self {
            Command::Interactive { .. } => false,
            Command::Convert { json, .. } | Command::Merge { json, .. } => *json,
        }
    }
}

/// Expand `convert` inputs: directories become their convertible files,
/// anything else is passed through as given.
pub fn expand_inputs(inputs: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    inputs
        .iter()
        .flat_map(|input| {
            if input.is_dir() {
                return discovery::convertible_files(input, &config.converter.extensions);
            }
            if !config.converter.is_convertible(input) {
                warn!(path = %input.display(), "unrecognised extension, converting anyway");
            }
            vec![input.clone()]
        })
        .collect()
}

/// Install the global tracing subscriber writing to stderr.
///
/// `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let layer = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| SlideCatError::other(format!("failed to init logging: {e}")))
}
