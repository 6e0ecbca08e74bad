//! Document to PDF conversion through an external headless office suite.

pub mod converter;

pub use converter::{ConversionOutcome, Converter, classify};
