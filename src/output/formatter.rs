//! Message formatting and display.
//!
//! Regular messages go to stdout and are silenced by quiet mode. Warnings and
//! errors go to stderr and are always shown, so `--json` output on stdout
//! stays machine-readable.
//!
//! # Examples
//!
//! ```
//! use slidecat::output::formatter::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Scanning directory...");
//! formatter.success("Converted 3 file(s)");
//! formatter.warning("deck.pptx: conversion failed");
//! ```

use crate::config::Config;
use std::io;

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "\x1b[32m", // Green
            Self::Warning => "\x1b[33m", // Yellow
            Self::Error => "\x1b[31m",   // Red
            Self::Debug => "\x1b[36m",   // Cyan
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: Self::should_use_color(),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Disable ANSI colors regardless of the terminal.
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn should_use_color() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal() && std::env::var("TERM").is_ok()
    }

    /// Render a message the way it would be printed.
    pub fn format(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        let color = level.color();
        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let line = self.format(level, message);
        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message. Always displayed.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message. Always displayed.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a debug message. Only displayed in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Print a section header.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
            println!("{}", "─".repeat(title.chars().count()));
        }
    }

    /// Print a labelled value.
    pub fn detail(&self, label: &str, value: &str) {
        if !self.quiet {
            println!("  {label}: {value}");
        }
    }

    /// Print a numbered list item (1-based).
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            println!("  {index}. {message}");
        }
    }

    /// Print a blank line.
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Print a boxed panel.
    pub fn panel(&self, title: &str, lines: &[String]) {
        if !self.quiet {
            println!("{}", render_panel(title, lines));
        }
    }

    /// Check if regular output is shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Check if verbose output should be shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

/// Draw `lines` inside a box with `title` in the top border.
pub fn render_panel(title: &str, lines: &[String]) -> String {
    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(title.chars().count() + 2))
        .max()
        .unwrap_or(0)
        + 2;

    let title_part = format!(" {title} ");
    let fill = inner.saturating_sub(title_part.chars().count());
    let mut out = format!("╭─{title_part}{}╮\n", "─".repeat(fill.saturating_sub(1)));

    for line in lines {
        let pad = inner - 2 - line.chars().count();
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    out.push_str(&format!("╰{}╯", "─".repeat(inner)));
    out
}
