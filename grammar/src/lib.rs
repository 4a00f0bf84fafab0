//! TextMate grammar synthesis for the CSM language.
//!
//! The grammar is generated rather than hand-written so that every command
//! documented in the OpenCSM header is highlighted as a call, while a few
//! structured commands keep dedicated, more precise region rules.
//!
//! - [`KeywordCatalog`]: control, function and supplementary vocabularies.
//! - [`pattern`]: case-insensitive literal compilation and alternations.
//! - [`synthesize`]: assembles the [`GrammarDocument`](csm_docs_core::GrammarDocument)
//!   in [`PRECEDENCE`] order.
//!
//! # Example
//!
//! ```
//! use csm_docs_core::validate_grammar;
//! use csm_docs_grammar::{GrammarOptions, KeywordCatalog, synthesize};
//!
//! let catalog = KeywordCatalog::builtin();
//! let grammar = synthesize(&catalog, ["BOX", "SKBEG"], &GrammarOptions::default()).unwrap();
//! assert_eq!(grammar.name, "CSM");
//! assert!(validate_grammar(&grammar).is_empty());
//! ```

mod catalog;
pub mod pattern;
mod synthesize;

pub use catalog::{
    CONTROL_KEYWORDS, FUNCTION_KEYWORDS, KeywordCatalog, KeywordKind, SUPPLEMENTARY_VOCABULARY,
    parse_keyword_list,
};
pub use pattern::{
    case_insensitive_alternation, case_insensitive_group, case_insensitive_literal,
    literal_alternation, ordered_alternatives,
};
pub use synthesize::{
    DEDICATED_REGIONS, DedicatedRegion, GrammarOptions, PRECEDENCE, RegionBody, SynthesisError,
    TMLANGUAGE_SCHEMA_URL, dedicated_keywords, synthesize,
};
