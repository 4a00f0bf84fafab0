//! Grammar synthesis.
//!
//! Builds a [`GrammarDocument`] from a [`KeywordCatalog`] and the command
//! names of a [`CommandIndex`](csm_docs_core::CommandIndex). Output is fully
//! determined by the *sets* of keywords and names: repository keys are sorted,
//! alternations are de-duplicated and ordered, and the top-level precedence is
//! the fixed [`PRECEDENCE`] table.

use csm_docs_core::{
    Capture, Captures, GrammarDocument, RegionRule, Rule, RuleSet, ValidationError,
    scope_suffix, validate_grammar,
};
use thiserror::Error;
use tracing::debug;

use crate::catalog::KeywordCatalog;
use crate::pattern::{case_insensitive_alternation, case_insensitive_group, literal_alternation};

/// Public JSON schema for TextMate grammars.
pub const TMLANGUAGE_SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/martinring/tmlanguage/master/tmlanguage.json";

/// Region end boundary: just before a comment marker, or end of line.
const REGION_END: &str = "(?=#|$)";

const IDENT: &str = "[a-zA-Z_][a-zA-Z0-9_]*";
const NUMBER: &str = "[-+]?[0-9]*\\.?[0-9]+(?:[eE][-+]?[0-9]+)?";
const TO_LINE_END: &str = "(?=\\s*(?:#|$))";

/// Top-level matching precedence, first entry tried first.
///
/// Dedicated command regions come before the generic function-call region,
/// which comes before the keyword, operator and fallback rules.
pub const PRECEDENCE: &[&str] = &[
    "udp-commands",
    "csm-parameter-commands",
    "comments",
    "strings",
    "numbers",
    "at-variables",
    "function-calls",
    "control-keywords",
    "function-keywords",
    "operators",
    "invalid-lines",
    "variables",
];

/// Argument layout inside a dedicated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionBody {
    /// `UDPARG`/`UDPRIM`: primitive type, then `$name value` pairs.
    UdpArguments,
    /// Parameter declarations: `$name value` or `name value`.
    ParameterDeclaration,
    /// Geometry primitives: every argument is a parameter value.
    GeometryArguments,
    /// `IFTHEN`: `$opN` operators and comparison keywords.
    Conditional,
}

/// A command family that owns its own region rule.
#[derive(Debug, Clone, Copy)]
pub struct DedicatedRegion {
    /// Repository entry the region is placed in.
    pub group: &'static str,
    /// Suffix of the region's `meta.function-call.*` token class.
    pub meta: &'static str,
    pub keywords: &'static [&'static str],
    pub body: RegionBody,
}

/// Dedicated regions, in the order they appear inside their groups.
pub const DEDICATED_REGIONS: &[DedicatedRegion] = &[
    DedicatedRegion {
        group: "udp-commands",
        meta: "udparg",
        keywords: &["udparg"],
        body: RegionBody::UdpArguments,
    },
    DedicatedRegion {
        group: "udp-commands",
        meta: "udprim",
        keywords: &["udprim"],
        body: RegionBody::UdpArguments,
    },
    DedicatedRegion {
        group: "csm-parameter-commands",
        meta: "parameter",
        keywords: &["attribute", "cfgpmtr", "despmtr", "outpmtr", "patbeg"],
        body: RegionBody::ParameterDeclaration,
    },
    DedicatedRegion {
        group: "csm-parameter-commands",
        meta: "geometry",
        keywords: &["box", "cylinder", "sphere", "cone", "torus"],
        body: RegionBody::GeometryArguments,
    },
    DedicatedRegion {
        group: "csm-parameter-commands",
        meta: "ifthen",
        keywords: &["ifthen"],
        body: RegionBody::Conditional,
    },
];

/// Keywords removed from the generic function-call rule because a dedicated
/// region already claims them.
pub fn dedicated_keywords() -> Vec<&'static str> {
    DEDICATED_REGIONS
        .iter()
        .flat_map(|region| region.keywords.iter().copied())
        .collect()
}

/// Grammar identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarOptions {
    pub name: String,
    pub scope_name: String,
    pub schema_url: Option<String>,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            name: "CSM".to_string(),
            scope_name: "source.csm".to_string(),
            schema_url: Some(TMLANGUAGE_SCHEMA_URL.to_string()),
        }
    }
}

/// The composed grammar failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("synthesized grammar is invalid: {}", join_errors(.0))]
pub struct SynthesisError(pub Vec<ValidationError>);

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builds the CSM grammar.
///
/// Keyword content never causes an error; [`SynthesisError`] is returned only
/// if the composed rule tree has a dangling reference or a reference cycle.
///
/// # Examples
///
/// ```
/// use csm_docs_grammar::{GrammarOptions, KeywordCatalog, synthesize};
///
/// let grammar = synthesize(&KeywordCatalog::builtin(), ["SKETCH"], &GrammarOptions::default())
///     .unwrap();
/// assert_eq!(grammar.scope_name, "source.csm");
/// assert!(grammar.repository.contains_key("function-calls"));
/// ```
pub fn synthesize<'a>(
    catalog: &KeywordCatalog,
    command_names: impl IntoIterator<Item = &'a str>,
    options: &GrammarOptions,
) -> Result<GrammarDocument, SynthesisError> {
    let builder = Builder {
        suffix: scope_suffix(&options.scope_name).to_string(),
    };

    let excluded = dedicated_keywords();
    let calls = catalog.function_call_commands(command_names, &excluded);
    debug!(
        control = catalog.control().len(),
        function = catalog.function().len(),
        calls = calls.len(),
        "Synthesizing grammar"
    );

    let mut grammar = GrammarDocument::new(&options.name, &options.scope_name);
    grammar.schema = options.schema_url.clone();
    grammar.patterns = PRECEDENCE.iter().map(|key| Rule::include(key)).collect();

    for region in DEDICATED_REGIONS {
        grammar
            .repository
            .entry(region.group.to_string())
            .or_default()
            .patterns
            .push(builder.dedicated_region(region));
    }

    let entries = [
        ("comments", builder.comments()),
        ("strings", builder.strings()),
        ("numbers", builder.numbers()),
        ("at-variables", builder.at_variables()),
        (
            "function-calls",
            builder.function_calls(calls.iter().map(String::as_str)),
        ),
        ("function-parameters", builder.function_parameters()),
        (
            "control-keywords",
            vec![Rule::matching(
                &builder.class("keyword.control"),
                case_insensitive_alternation(
                    catalog.control().iter().map(String::as_str),
                    "control_keywords",
                ),
            )],
        ),
        (
            "function-keywords",
            vec![Rule::matching(
                &builder.class("entity.name.tag"),
                literal_alternation(
                    catalog.function().iter().map(String::as_str),
                    "function_keywords",
                ),
            )],
        ),
        (
            "operators",
            vec![Rule::matching(
                &builder.class("keyword.operator"),
                r"[+\-*/=<>!&|^%~]+",
            )],
        ),
        (
            "variables",
            vec![Rule::matching(
                &builder.class("variable.other"),
                format!(r"\b{IDENT}\b"),
            )],
        ),
        (
            "invalid-lines",
            vec![Rule::matching(&builder.class("invalid"), r"^\s*[^#\s].*$")],
        ),
    ];
    for (key, patterns) in entries {
        grammar
            .repository
            .insert(key.to_string(), RuleSet::new(patterns));
    }

    let errors = validate_grammar(&grammar);
    if !errors.is_empty() {
        return Err(SynthesisError(errors));
    }
    Ok(grammar)
}

struct Builder {
    suffix: String,
}

impl Builder {
    fn class(&self, base: &str) -> String {
        format!("{base}.{}", self.suffix)
    }

    fn caps(&self, groups: &[(u8, &str)]) -> Captures {
        groups
            .iter()
            .map(|(group, base)| {
                (
                    group.to_string(),
                    Capture {
                        name: self.class(base),
                    },
                )
            })
            .collect()
    }

    fn escape_rule(&self) -> Rule {
        Rule::matching(&self.class("constant.character.escape"), r"\\.")
    }

    fn region(
        &self,
        name: Option<String>,
        begin: String,
        begin_class: &str,
        end: &str,
        patterns: Vec<Rule>,
    ) -> Rule {
        Rule::Region(RegionRule {
            name,
            begin,
            begin_captures: if begin_class.is_empty() {
                Default::default()
            } else {
                self.caps(&[(1, begin_class)])
            },
            end: end.to_string(),
            patterns,
        })
    }

    fn dedicated_region(&self, region: &DedicatedRegion) -> Rule {
        let keywords = case_insensitive_group(region.keywords.iter().copied(), region.meta);
        self.region(
            Some(self.class(&format!("meta.function-call.{}", region.meta))),
            format!(r"^\s*({keywords})\s+"),
            "keyword.control",
            REGION_END,
            self.region_body(region.body),
        )
    }

    fn region_body(&self, body: RegionBody) -> Vec<Rule> {
        match body {
            RegionBody::UdpArguments => vec![
                Rule::capturing(
                    format!(r"\G({IDENT})"),
                    self.caps(&[(1, "entity.name.type")]),
                ),
                Rule::capturing(
                    format!(r"\s+({IDENT})\s+({IDENT})"),
                    self.caps(&[
                        (1, "support.type"),
                        (2, "variable.other"),
                    ]),
                ),
            ],
            RegionBody::ParameterDeclaration => vec![
                Rule::capturing(
                    format!(r"(\${IDENT})\s+(.+?){TO_LINE_END}"),
                    self.caps(&[
                        (1, "entity.name.tag"),
                        (2, "string.quoted"),
                    ]),
                ),
                Rule::capturing(
                    format!(r"({IDENT})\s+({NUMBER}){TO_LINE_END}"),
                    self.caps(&[
                        (1, "variable.other"),
                        (2, "constant.numeric"),
                    ]),
                ),
                Rule::capturing(
                    format!(r"({IDENT})\s+(.+?){TO_LINE_END}"),
                    self.caps(&[
                        (1, "variable.other"),
                        (2, "string.quoted"),
                    ]),
                ),
                Rule::capturing(
                    format!(r"(\${IDENT}){TO_LINE_END}"),
                    self.caps(&[(1, "entity.name.tag")]),
                ),
                Rule::capturing(
                    format!(r"({IDENT}){TO_LINE_END}"),
                    self.caps(&[(1, "variable.other")]),
                ),
            ],
            RegionBody::GeometryArguments => vec![Rule::capturing(
                format!(r"({IDENT}|{NUMBER})"),
                self.caps(&[(1, "constant.numeric")]),
            )],
            RegionBody::Conditional => vec![
                Rule::capturing(
                    r"(\$(?:op[0-9]+|type))(?:=([a-zA-Z]+))?",
                    self.caps(&[
                        (1, "keyword.operator"),
                        (2, "constant.language"),
                    ]),
                ),
                Rule::capturing(
                    r"\b(lt|LT|le|LE|eq|EQ|ge|GE|gt|GT|ne|NE|or|OR|and|AND|xor|XOR)\b",
                    self.caps(&[(1, "keyword.operator")]),
                ),
            ],
        }
    }

    fn comments(&self) -> Vec<Rule> {
        vec![self.region(
            Some(self.class("comment.line.number-sign")),
            "#".to_string(),
            "",
            "$",
            vec![self.escape_rule()],
        )]
    }

    fn strings(&self) -> Vec<Rule> {
        vec![
            self.region(
                Some(self.class("string.quoted.double")),
                "\"".to_string(),
                "",
                "\"",
                vec![self.escape_rule()],
            ),
            self.region(
                Some(self.class("string.quoted.single")),
                "'".to_string(),
                "",
                "'",
                vec![self.escape_rule()],
            ),
        ]
    }

    fn numbers(&self) -> Vec<Rule> {
        vec![
            Rule::matching(
                &self.class("constant.numeric.float"),
                r"\b\d+\.\d+([eE][+-]?\d+)?\b",
            ),
            Rule::matching(&self.class("constant.numeric.integer"), r"\b\d+\b"),
        ]
    }

    fn at_variables(&self) -> Vec<Rule> {
        vec![Rule::matching(
            &self.class("entity.name.tag"),
            format!("@{IDENT}"),
        )]
    }

    fn function_calls<'a>(&self, commands: impl IntoIterator<Item = &'a str>) -> Vec<Rule> {
        let alternation = case_insensitive_group(commands, "commands");
        vec![self.region(
            None,
            format!(r"^\s*({alternation})\s+"),
            "entity.name.function",
            REGION_END,
            vec![Rule::include("function-parameters")],
        )]
    }

    fn function_parameters(&self) -> Vec<Rule> {
        vec![
            Rule::matching(&self.class("variable.parameter"), format!(r"\${IDENT}")),
            Rule::matching(
                &self.class("constant.numeric.parameter"),
                r"\b[-+]?\d+(\.\d+)?([eE][-+]?\d+)?\b",
            ),
            Rule::matching(&self.class("string.quoted.parameter"), r#""[^"]*""#),
            Rule::matching(&self.class("punctuation.separator.parameter"), r"[=;,()]"),
            Rule::include("at-variables"),
        ]
    }
}
