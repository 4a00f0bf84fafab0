//! Persistence, hover lookup and the build pipeline for CSM documentation.
//!
//! This crate ties the extractor and the grammar synthesizer to the
//! filesystem:
//!
//! - [`DocumentationIndex`]: load/save the command index (atomic writes).
//! - [`HoverResolver`]: token under the cursor to a [`HoverPayload`].
//! - [`PipelineConfig`]: YAML configuration (`csm-docs.yml`).
//! - [`run_pipeline`]: header → index → grammar, with the fallback order
//!   header, persisted index, keyword-only.
//!
//! # Quick start
//!
//! ```no_run
//! use csm_docs_db::{HoverResolver, PipelineConfig, run_pipeline};
//!
//! let config = PipelineConfig::load_or_default("csm-docs.yml").unwrap();
//! let report = run_pipeline(&config).unwrap();
//! println!("{} commands, grammar {}", report.commands, report.grammar_sha256);
//!
//! let resolver = HoverResolver::from_path(&config.paths.index).unwrap();
//! if let Some(payload) = resolver.resolve("box") {
//!     println!("{}", payload.to_markdown());
//! }
//! ```

mod atomic;
mod config;
mod error;
mod hover;
mod index;
mod pipeline;

pub use atomic::write_atomic;
pub use config::{DEFAULT_CONFIG_FILE, GrammarConfig, KeywordsConfig, PathsConfig, PipelineConfig};
pub use error::{DocsError, IoOperation, Result};
pub use hover::{HoverPayload, HoverResolver, HoverSection, LANGUAGE_ID, canonical_token, resolve};
pub use index::{DEFAULT_INDEX_FILE, DocumentationIndex};
pub use pipeline::{BuildReport, IndexSource, run_pipeline, sha256_hex};
