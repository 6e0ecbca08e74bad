//! Sequential batch execution with per-item failure isolation.
//!
//! Conversion and merging share one control-flow shape: iterate the inputs,
//! attempt one operation per item, classify the result, record it, and move
//! on. [`BatchRunner`] owns the bookkeeping for that loop so that a failure on
//! item `i` can never prevent items `i+1..n` from being attempted, and so that
//! every failure is kept with enough context to be reported individually.

use std::path::Path;
use tracing::{error, warn};

use crate::error::ItemError;

/// Outcome of one item, as seen by a progress observer.
#[derive(Debug, Clone, Copy)]
pub enum ItemStatus<'a> {
    /// The item was processed successfully.
    Succeeded,
    /// The item failed and was skipped.
    Failed(&'a ItemError),
}

/// Aggregate counts for a finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Human-readable batch label, e.g. "Converting".
    pub label: String,
    /// Number of items in the batch.
    pub total: usize,
    /// Items that succeeded.
    pub succeeded: usize,
    /// Items that failed.
    pub failed: usize,
}

/// Observer notified as a batch progresses.
///
/// Notifications carry no control-flow significance: an observer cannot stop
/// or alter the batch.
pub trait ProgressObserver {
    /// A batch of `total` items is about to start.
    fn on_batch_start(&mut self, _label: &str, _total: usize) {}

    /// Item `index` (0-based) named `name` is about to be processed.
    fn on_item_start(&mut self, index: usize, total: usize, name: &str);

    /// Item `index` finished.
    fn on_item_done(&mut self, index: usize, status: ItemStatus<'_>);

    /// The whole batch finished.
    fn on_batch_done(&mut self, summary: &BatchSummary);
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_item_start(&mut self, _index: usize, _total: usize, _name: &str) {}

    fn on_item_done(&mut self, _index: usize, _status: ItemStatus<'_>) {}

    fn on_batch_done(&mut self, _summary: &BatchSummary) {}
}

/// Positive and negative outcomes of a batch.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// Successful results, in processing order.
    pub successes: Vec<T>,

    /// Failures, in processing order. Each one names its item.
    pub failures: Vec<ItemError>,
}

impl<T> BatchReport<T> {
    /// Number of items that were attempted.
    pub fn attempted(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// True when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures as `(item, message)` pairs.
    pub fn failure_messages(&self) -> impl Iterator<Item = (&Path, String)> {
        self.failures.iter().map(|e| (e.path(), e.to_string()))
    }
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Bookkeeping for one sequential batch.
///
/// Call [`begin`](Self::begin) before each item, then exactly one of
/// [`succeed`](Self::succeed), [`fail`](Self::fail) or [`record`](Self::record).
pub struct BatchRunner<'o, T> {
    label: String,
    total: usize,
    index: Option<usize>,
    observer: &'o mut dyn ProgressObserver,
    report: BatchReport<T>,
}

impl<'o, T> BatchRunner<'o, T> {
    /// Start a batch and notify the observer.
    pub fn new(label: impl Into<String>, total: usize, observer: &'o mut dyn ProgressObserver) -> Self {
        let label = label.into();
        observer.on_batch_start(&label, total);
        Self {
            label,
            total,
            index: None,
            observer,
            report: BatchReport::default(),
        }
    }

    /// Mark the start of the next item.
    pub fn begin(&mut self, name: &str) {
        let index = self.index.map_or(0, |i| i + 1);
        self.index = Some(index);
        self.observer.on_item_start(index, self.total, name);
    }

    /// Record a successful item.
    pub fn succeed(&mut self, value: T) {
        self.report.successes.push(value);
        self.observer
            .on_item_done(self.current_index(), ItemStatus::Succeeded);
    }

    /// Record a failed item and keep going.
    pub fn fail(&mut self, err: ItemError) {
        if err.is_severe() {
            error!(path = %err.path().display(), "{err}");
        } else {
            warn!(path = %err.path().display(), "{err}");
        }
        self.observer
            .on_item_done(self.current_index(), ItemStatus::Failed(&err));
        self.report.failures.push(err);
    }

    /// Record either outcome.
    pub fn record(&mut self, result: std::result::Result<T, ItemError>) {
        match result {
            Ok(value) => self.succeed(value),
            Err(err) => self.fail(err),
        }
    }

    /// Finish the batch, notify the observer and hand back the report.
    pub fn finish(self) -> BatchReport<T> {
        let summary = BatchSummary {
            label: self.label,
            total: self.total,
            succeeded: self.report.successes.len(),
            failed: self.report.failures.len(),
        };
        self.observer.on_batch_done(&summary);
        self.report
    }

    fn current_index(&self) -> usize {
        self.index.unwrap_or(0)
    }
}
