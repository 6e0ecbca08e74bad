//! PDF merging.
//!
//! [`Merger`] drives the batch; [`PageAccumulator`] does the page-tree work.

pub mod merger;
pub mod pages;

pub use merger::{MergeOutcome, MergedFile, Merger};
pub use pages::PageAccumulator;
