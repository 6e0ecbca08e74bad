//! Terminal progress display for batches.
//!
//! [`ProgressBar`] is a [`ProgressObserver`]: the converter and merger drive
//! it through the observer trait and never touch the terminal themselves.
//! Failures are printed as they happen, above the bar, with long tool output
//! cut to a short snippet.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::batch::{BatchSummary, ItemStatus, ProgressObserver};
use crate::utils::{SNIPPET_LIMIT, snippet};

const BAR_WIDTH: usize = 30;

/// Progress bar for visual feedback during batches.
pub struct ProgressBar {
    label: String,
    item: String,
    total: usize,
    done: usize,
    start_time: Instant,
    /// Redraw the bar in place (stdout is a terminal).
    interactive: bool,
    /// Suppress everything except live failure lines.
    quiet: bool,
}

impl ProgressBar {
    /// Create a progress bar that redraws in place when stdout is a terminal.
    pub fn new(quiet: bool) -> Self {
        use std::io::IsTerminal;
        Self::with_terminal(io::stdout().is_terminal(), quiet)
    }

    /// Create a progress bar with explicit terminal detection.
    pub fn with_terminal(interactive: bool, quiet: bool) -> Self {
        Self {
            label: String::new(),
            item: String::new(),
            total: 0,
            done: 0,
            start_time: Instant::now(),
            interactive,
            quiet,
        }
    }

    /// Completed fraction in percent.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.done as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Render the current bar line, e.g.
    /// `Converting deck.pptx [=======>      ] 2/4  50% 3s`.
    pub fn render(&self) -> String {
        let filled = (BAR_WIDTH * self.done) / self.total.max(1);
        let bar = if filled == 0 {
            " ".repeat(BAR_WIDTH)
        } else {
            format!(
                "{}>{}",
                "=".repeat(filled - 1),
                " ".repeat(BAR_WIDTH - filled)
            )
        };

        let mut line = self.label.clone();
        if !self.item.is_empty() {
            line.push(' ');
            line.push_str(&self.item);
        }
        format!(
            "{line} [{bar}] {}/{} {:>3.0}% {}",
            self.done,
            self.total,
            self.percent(),
            format_duration(self.start_time.elapsed())
        )
    }

    /// Render the line printed for a failed item.
    pub fn render_failure(name: &str, message: &str) -> String {
        format!("✗ {name}: {}", snippet(message, SNIPPET_LIMIT))
    }

    fn redraw(&self) {
        if self.interactive && !self.quiet {
            print!("\r\x1b[K{}", self.render());
            io::stdout().flush().ok();
        }
    }

    fn clear(&self) {
        if self.interactive && !self.quiet {
            print!("\r\x1b[K");
            io::stdout().flush().ok();
        }
    }
}

impl ProgressObserver for ProgressBar {
    fn on_batch_start(&mut self, label: &str, total: usize) {
        self.label = label.to_string();
        self.item.clear();
        self.total = total;
        self.done = 0;
        self.start_time = Instant::now();
        self.redraw();
    }

    fn on_item_start(&mut self, _index: usize, _total: usize, name: &str) {
        self.item = name.to_string();
        self.redraw();
    }

    fn on_item_done(&mut self, _index: usize, status: ItemStatus<'_>) {
        self.done += 1;
        if let ItemStatus::Failed(err) = status {
            self.clear();
            eprintln!("{}", Self::render_failure(&self.item, &err.to_string()));
        } else if !self.interactive && !self.quiet {
            println!("  [{}/{}] {}", self.done, self.total, self.item);
        }
        self.redraw();
    }

    fn on_batch_done(&mut self, summary: &BatchSummary) {
        self.item.clear();
        self.done = summary.total;
        if self.interactive && !self.quiet {
            self.redraw();
            println!();
        }
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
