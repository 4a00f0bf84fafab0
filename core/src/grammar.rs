//! Tokenization grammar data model.
//!
//! A [`GrammarDocument`] is pure data in the TextMate grammar layout: an
//! ordered top-level list of [`Rule`]s, a repository of named [`RuleSet`]s,
//! and a dotted scope name. Rules form a tree of three variants:
//!
//! - [`Rule::Match`]: a token class plus a single regular expression.
//! - [`Rule::Region`]: begin/end expressions with nested sub-rules that only
//!   apply between the two boundaries.
//! - [`Rule::Include`]: a `#name` reference to a repository entry.
//!
//! Serialization matches the field names consumed by TextMate-compatible
//! tokenizers (`match`, `begin`, `beginCaptures`, `include`, `scopeName`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Token-class annotations keyed by capture group number.
pub type Captures = BTreeMap<String, Capture>;

/// Token class assigned to one capture group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub name: String,
}

/// Builds a [`Captures`] map from `(group, token class)` pairs.
///
/// # Examples
///
/// ```
/// use csm_docs_core::captures;
///
/// let caps = captures(&[(1, "keyword.control.csm"), (2, "variable.other.csm")]);
/// assert_eq!(caps["1"].name, "keyword.control.csm");
/// assert_eq!(caps.len(), 2);
/// ```
pub fn captures(groups: &[(u8, &str)]) -> Captures {
    groups
        .iter()
        .map(|(group, name)| {
            (
                group.to_string(),
                Capture {
                    name: (*name).to_string(),
                },
            )
        })
        .collect()
}

/// A single-expression rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "match")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub captures: Captures,
}

/// A delimited region with its own nested rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub begin: String,
    #[serde(
        rename = "beginCaptures",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub begin_captures: Captures,
    pub end: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<Rule>,
}

/// Reference to a repository entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeRule {
    pub include: String,
}

impl IncludeRule {
    /// Repository key this reference points to, or `None` when the reference
    /// is not of the `#name` form.
    pub fn target(&self) -> Option<&str> {
        self.include
            .strip_prefix('#')
            .filter(|name| !name.is_empty())
    }
}

/// One node of the rule tree.
///
/// Deserialization distinguishes variants by their required fields
/// (`include`, then `begin`/`end`, then `match`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    Include(IncludeRule),
    Region(RegionRule),
    Match(MatchRule),
}

impl Rule {
    /// Creates a `#name` reference.
    pub fn include(target: &str) -> Self {
        Rule::Include(IncludeRule {
            include: format!("#{target}"),
        })
    }

    /// Creates a named match rule without captures.
    pub fn matching(name: &str, pattern: impl Into<String>) -> Self {
        Rule::Match(MatchRule {
            name: Some(name.to_string()),
            pattern: pattern.into(),
            captures: Captures::new(),
        })
    }

    /// Creates an unnamed match rule whose token classes come from captures.
    pub fn capturing(pattern: impl Into<String>, captures: Captures) -> Self {
        Rule::Match(MatchRule {
            name: None,
            pattern: pattern.into(),
            captures,
        })
    }

    /// Nested rules of a region; empty for other variants.
    pub fn children(&self) -> &[Rule] {
        match self {
            Rule::Region(region) => &region.patterns,
            Rule::Include(_) | Rule::Match(_) => &[],
        }
    }

    /// Visits this rule and every rule nested below it, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Rule)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// A repository entry: an ordered list of alternative rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub patterns: Vec<Rule>,
}

impl RuleSet {
    pub fn new(patterns: Vec<Rule>) -> Self {
        Self { patterns }
    }

    /// Repository keys referenced anywhere inside this entry.
    pub fn references(&self) -> Vec<&IncludeRule> {
        let mut refs = Vec::new();
        for rule in &self.patterns {
            rule.walk(&mut |node| {
                if let Rule::Include(include) = node {
                    refs.push(include);
                }
            });
        }
        refs
    }
}

/// A complete tokenization grammar.
///
/// # Examples
///
/// ```
/// use csm_docs_core::{GrammarDocument, Rule, RuleSet};
///
/// let mut grammar = GrammarDocument::new("CSM", "source.csm");
/// grammar.patterns.push(Rule::include("numbers"));
/// grammar.repository.insert(
///     "numbers".into(),
///     RuleSet::new(vec![Rule::matching("constant.numeric.integer.csm", r"\b\d+\b")]),
/// );
///
/// let json = serde_json::to_value(&grammar).unwrap();
/// assert_eq!(json["scopeName"], "source.csm");
/// assert_eq!(json["patterns"][0]["include"], "#numbers");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDocument {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    pub patterns: Vec<Rule>,
    pub repository: BTreeMap<String, RuleSet>,
    #[serde(rename = "scopeName")]
    pub scope_name: String,
}

impl GrammarDocument {
    pub fn new(name: impl Into<String>, scope_name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            patterns: Vec::new(),
            repository: BTreeMap::new(),
            scope_name: scope_name.into(),
        }
    }

    /// Token-class suffix derived from the scope name (`source.csm` → `csm`).
    pub fn language_suffix(&self) -> &str {
        scope_suffix(&self.scope_name)
    }

    /// Serializes to pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut raw = serde_json::to_string_pretty(self)?;
        raw.push('\n');
        Ok(raw)
    }
}

/// Last dotted segment of a scope name.
pub fn scope_suffix(scope_name: &str) -> &str {
    scope_name.rsplit('.').next().unwrap_or(scope_name)
}
