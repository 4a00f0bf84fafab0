//! Command index and grammar validation.
//!
//! Validates structural invariants before an artifact is persisted or after it
//! is reloaded: command-name shape and key consistency for a
//! [`CommandIndex`], and reference integrity for a [`GrammarDocument`]
//! (every `#name` resolves, no entry is empty, no reference cycle exists).
//!
//! # Examples
//!
//! ```
//! use csm_docs_core::*;
//!
//! let mut grammar = GrammarDocument::new("CSM", "source.csm");
//! grammar.patterns.push(Rule::include("missing"));
//! let errors = validate_grammar(&grammar);
//! assert!(errors.iter().any(|e| matches!(e, ValidationError::DanglingReference { .. })));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::{CommandIndex, GrammarDocument, Rule, is_command_name};

/// Index/grammar validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A command name does not match the uppercase command-name shape.
    #[error("invalid command name: {0:?}")]
    InvalidCommandName(String),
    /// An index key differs from the `name` of the record stored under it.
    #[error("index key {key:?} holds record named {name:?}")]
    KeyMismatch { key: String, name: String },
    /// A record's syntax does not begin with its name.
    #[error("syntax of {0} does not start with its name")]
    SyntaxMismatch(String),
    /// The grammar has an empty name or scope name.
    #[error("grammar {0} cannot be empty")]
    EmptyGrammarField(&'static str),
    /// A reference is not of the `#name` form.
    #[error("malformed reference {include:?} in {owner}")]
    MalformedReference { owner: String, include: String },
    /// A reference points at a repository key that does not exist.
    #[error("reference to unknown rule {target:?} in {owner}")]
    DanglingReference { owner: String, target: String },
    /// A repository entry has no rules.
    #[error("repository entry {0} has no patterns")]
    EmptyRuleSet(String),
    /// Repository entries reference each other in a loop.
    #[error("reference cycle detected: {0}")]
    ReferenceCycle(String),
}

/// Validates a command index.
///
/// # Examples
///
/// ```
/// use csm_docs_core::*;
///
/// let mut index = CommandIndex::new();
/// index.insert(CommandRecord::new("BOX", "xmin ymin zmin dx dy dz"));
/// assert!(validate_index(&index).is_empty());
///
/// index.insert(CommandRecord::new("box", "lowercase"));
/// assert_eq!(
///     validate_index(&index),
///     vec![ValidationError::InvalidCommandName("box".into())]
/// );
/// ```
pub fn validate_index(index: &CommandIndex) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (key, record) in index.iter() {
        if !is_command_name(key) {
            errors.push(ValidationError::InvalidCommandName(key.to_string()));
            continue;
        }
        if key != record.name {
            errors.push(ValidationError::KeyMismatch {
                key: key.to_string(),
                name: record.name.clone(),
            });
            continue;
        }
        if !record.syntax.starts_with(&record.name) {
            errors.push(ValidationError::SyntaxMismatch(key.to_string()));
        }
    }

    errors
}

/// Validates reference integrity of a grammar.
///
/// Checks run in order and stop at the first failing stage: empty fields,
/// malformed/dangling references and empty entries, then cycles. Cycle
/// detection is only meaningful once every reference resolves.
///
/// # Examples
///
/// ```
/// use csm_docs_core::*;
///
/// let mut grammar = GrammarDocument::new("CSM", "source.csm");
/// grammar.patterns.push(Rule::include("a"));
/// grammar.repository.insert("a".into(), RuleSet::new(vec![Rule::include("b")]));
/// grammar.repository.insert("b".into(), RuleSet::new(vec![Rule::include("a")]));
///
/// assert_eq!(
///     validate_grammar(&grammar),
///     vec![ValidationError::ReferenceCycle("a -> b -> a".into())]
/// );
/// ```
pub fn validate_grammar(grammar: &GrammarDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if grammar.name.trim().is_empty() {
        errors.push(ValidationError::EmptyGrammarField("name"));
    }
    if grammar.scope_name.trim().is_empty() {
        errors.push(ValidationError::EmptyGrammarField("scopeName"));
    }
    if !errors.is_empty() {
        return errors;
    }

    let mut top_level = Vec::new();
    for rule in &grammar.patterns {
        rule.walk(&mut |node| {
            if let Rule::Include(include) = node {
                top_level.push(include);
            }
        });
    }
    for include in top_level {
        check_reference(grammar, "patterns", &include.include, &mut errors);
    }

    let mut edges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (key, set) in &grammar.repository {
        if set.patterns.is_empty() {
            errors.push(ValidationError::EmptyRuleSet(key.clone()));
        }
        let targets = edges.entry(key.as_str()).or_default();
        for include in set.references() {
            if check_reference(grammar, key, &include.include, &mut errors) {
                if let Some(target) = include.target() {
                    targets.insert(target);
                }
            }
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    if let Some(cycle) = find_cycle(&edges) {
        errors.push(ValidationError::ReferenceCycle(cycle.join(" -> ")));
    }

    errors
}

fn check_reference(
    grammar: &GrammarDocument,
    owner: &str,
    include: &str,
    errors: &mut Vec<ValidationError>,
) -> bool {
    let Some(target) = include.strip_prefix('#').filter(|t| !t.is_empty()) else {
        errors.push(ValidationError::MalformedReference {
            owner: owner.to_string(),
            include: include.to_string(),
        });
        return false;
    };
    if !grammar.repository.contains_key(target) {
        errors.push(ValidationError::DanglingReference {
            owner: owner.to_string(),
            target: target.to_string(),
        });
        return false;
    }
    true
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search over the reference graph. Returns the first cycle found
/// (in key order), closed by repeating its first entry.
fn find_cycle<'a>(edges: &BTreeMap<&'a str, BTreeSet<&'a str>>) -> Option<Vec<&'a str>> {
    fn visit<'a>(
        node: &'a str,
        edges: &BTreeMap<&'a str, BTreeSet<&'a str>>,
        marks: &mut BTreeMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<&'a str>> {
        match marks.get(node) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = path.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(node);
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(node, Mark::Visiting);
        path.push(node);
        if let Some(targets) = edges.get(node) {
            for target in targets {
                if let Some(cycle) = visit(*target, edges, marks, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        marks.insert(node, Mark::Done);
        None
    }

    let mut marks = BTreeMap::new();
    for node in edges.keys() {
        let mut path = Vec::new();
        if let Some(cycle) = visit(*node, edges, &mut marks, &mut path) {
            return Some(cycle);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::{CommandRecord, RegionRule, RuleSet, captures};

    use super::*;

    fn grammar_with(entries: &[(&str, Vec<Rule>)]) -> GrammarDocument {
        let mut grammar = GrammarDocument::new("CSM", "source.csm");
        for (key, rules) in entries {
            grammar.patterns.push(Rule::include(key));
            grammar
                .repository
                .insert((*key).to_string(), RuleSet::new(rules.clone()));
        }
        grammar
    }

    #[test]
    fn test_validate_index_rejects_key_mismatch() {
        let raw = r#"{"BOX": {"name": "SPHERE", "syntax": "SPHERE r"}}"#;
        let index: CommandIndex = serde_json::from_str(raw).unwrap();
        assert_eq!(
            validate_index(&index),
            vec![ValidationError::KeyMismatch {
                key: "BOX".into(),
                name: "SPHERE".into(),
            }]
        );
    }

    #[test]
    fn test_validate_index_rejects_syntax_without_name() {
        let mut record = CommandRecord::new("BOX", "a b c");
        record.syntax = "a b c".into();
        let mut index = CommandIndex::new();
        index.insert(record);
        assert_eq!(
            validate_index(&index),
            vec![ValidationError::SyntaxMismatch("BOX".into())]
        );
    }

    #[test]
    fn test_validate_grammar_accepts_nested_references() {
        let grammar = grammar_with(&[
            (
                "calls",
                vec![Rule::Region(RegionRule {
                    name: None,
                    begin: r"^\s*(box)\s+".into(),
                    begin_captures: captures(&[(1, "entity.name.function.csm")]),
                    end: "(?=#|$)".into(),
                    patterns: vec![Rule::include("params")],
                })],
            ),
            ("params", vec![Rule::matching("variable.parameter.csm", r"\$\w+")]),
        ]);
        assert!(validate_grammar(&grammar).is_empty());
    }

    #[test]
    fn test_validate_grammar_reports_dangling_nested_reference() {
        let grammar = grammar_with(&[(
            "calls",
            vec![Rule::Region(RegionRule {
                name: None,
                begin: "a".into(),
                begin_captures: Default::default(),
                end: "$".into(),
                patterns: vec![Rule::include("nowhere")],
            })],
        )]);
        assert_eq!(
            validate_grammar(&grammar),
            vec![ValidationError::DanglingReference {
                owner: "calls".into(),
                target: "nowhere".into(),
            }]
        );
    }

    #[test]
    fn test_validate_grammar_reports_malformed_reference() {
        let mut grammar = grammar_with(&[]);
        grammar.patterns.push(Rule::Include(crate::IncludeRule {
            include: "$self".into(),
        }));
        assert!(matches!(
            validate_grammar(&grammar).as_slice(),
            [ValidationError::MalformedReference { .. }]
        ));
    }

    #[test]
    fn test_validate_grammar_reports_self_reference_as_cycle() {
        let grammar = grammar_with(&[("loop", vec![Rule::include("loop")])]);
        assert_eq!(
            validate_grammar(&grammar),
            vec![ValidationError::ReferenceCycle("loop -> loop".into())]
        );
    }

    #[test]
    fn test_validate_grammar_reports_empty_rule_set() {
        let grammar = grammar_with(&[("empty", Vec::new())]);
        assert_eq!(
            validate_grammar(&grammar),
            vec![ValidationError::EmptyRuleSet("empty".into())]
        );
    }

    #[test]
    fn test_validate_grammar_diamond_is_not_a_cycle() {
        let grammar = grammar_with(&[
            ("a", vec![Rule::include("b"), Rule::include("c")]),
            ("b", vec![Rule::include("d")]),
            ("c", vec![Rule::include("d")]),
            ("d", vec![Rule::matching("x", "x")]),
        ]);
        assert!(validate_grammar(&grammar).is_empty());
    }
}
