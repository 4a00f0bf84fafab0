//! Command documentation extraction from the OpenCSM header.
//!
//! The header documents each command with an unindented definition line
//! (`BOX   xmin ymin zmin dx dy dz`), optionally followed by a `use:` line and
//! a `notes:` block. This crate turns that text into a
//! [`CommandIndex`](csm_docs_core::CommandIndex).
//!
//! # Main entry points
//!
//! - [`extract`]: header text to index; never fails on content.
//! - [`extract_with_report`]: same, plus an [`ExtractionReport`].
//! - [`HeaderDocExtractor`]: streaming form for line-by-line input.
//!
//! Line classification lives in [`classify`]; its predicates are public so the
//! exclusion policy can be checked on its own.

pub mod classify;
mod extractor;
mod report;

pub use extractor::{HeaderDocExtractor, extract, extract_with_report};
pub use report::ExtractionReport;
