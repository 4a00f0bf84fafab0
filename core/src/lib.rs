//! Core types and validation for CSM command documentation.
//!
//! This crate defines the data shared by every stage of the documentation
//! pipeline:
//!
//! - [`CommandRecord`] / [`CommandIndex`]: documentation extracted from the
//!   OpenCSM header, keyed by canonical uppercase command name.
//! - [`GrammarDocument`]: a TextMate-style tokenization grammar built from a
//!   tree of [`Rule`]s (match, region, include) and a repository of named
//!   [`RuleSet`]s.
//!
//! Validation ([`validate_index`], [`validate_grammar`]) catches structural
//! errors such as malformed command names, dangling rule references, and
//! reference cycles.
//!
//! # Example
//!
//! ```
//! use csm_docs_core::*;
//!
//! let mut index = CommandIndex::new();
//! index.insert(
//!     CommandRecord::new("BOX", "xmin ymin zmin dx dy dz")
//!         .with_usage("creates a rectangular box"),
//! );
//!
//! assert_eq!(index.get("BOX").unwrap().syntax, "BOX xmin ymin zmin dx dy dz");
//! assert!(validate_index(&index).is_empty());
//! ```

mod grammar;
mod types;
mod validate;

pub use grammar::*;
pub use types::*;
pub use validate::{ValidationError, validate_grammar, validate_index};
