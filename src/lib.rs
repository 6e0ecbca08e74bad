//! slidecat - Convert presentations to PDF and merge them into one document.
//!
//! This library provides the pieces behind the `slidecat` binary:
//!
//! - Batch conversion through a headless office suite ([`convert`])
//! - Ordered PDF merging with per-file failure isolation ([`merge`])
//! - Atomic PDF output ([`io`])
//! - An interactive convert-then-merge session ([`session`])
//!
//! Every batch runs to completion. A file that fails to convert or to load
//! is recorded with a typed [`ItemError`] and the remaining files carry on.
//!
//! # Examples
//!
//! ## Merge a fixed list
//!
//! ```no_run
//! use slidecat::batch::NoProgress;
//! use slidecat::merge::Merger;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> slidecat::Result<()> {
//! let files = vec![PathBuf::from("intro.pdf"), PathBuf::from("talk.pdf")];
//! let outcome = Merger::new()
//!     .merge(&files, Path::new("all.pdf"), &mut NoProgress)
//!     .await
//!     .into_result()?;
//! println!("{} pages", outcome.pages_added);
//! # Ok(())
//! # }
//! ```
//!
//! ## Convert a directory
//!
//! ```no_run
//! use slidecat::batch::NoProgress;
//! use slidecat::config::{Config, ConverterCommand};
//! use slidecat::convert::Converter;
//! use slidecat::discovery::convertible_files;
//! use std::path::Path;
//!
//! # async fn example() -> slidecat::Result<()> {
//! let config = Config::default();
//! let command = ConverterCommand::resolve(&config.converter)?;
//! let converter = Converter::new(command, config.converter.timeout());
//!
//! let decks = convertible_files(Path::new("talks"), &config.converter.extensions);
//! let report = converter
//!     .convert(&decks, Path::new("talks/converted_pdfs"), &mut NoProgress)
//!     .await?;
//! println!("{} converted, {} failed", report.successes.len(), report.failures.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod discovery;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod prompt;
pub mod session;
pub mod utils;

pub use error::{ItemError, ItemErrorKind, Result, SlideCatError, ToolFailure};

/// Version of the slidecat library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the slidecat library.
pub const NAME: &str = env!("CARGO_PKG_NAME");
