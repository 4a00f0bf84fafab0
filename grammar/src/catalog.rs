//! Keyword vocabularies for the CSM grammar.
//!
//! The catalog holds three lowercase keyword sets. The function-call set used
//! by the grammar is derived from them with an explicit, order-independent
//! set pipeline:
//!
//! | Step | Operation | Source |
//! |------|-----------|--------|
//! | 1 | ∪ | control keywords |
//! | 2 | ∪ | function keywords |
//! | 3 | ∪ | command index names, case-folded |
//! | 4 | ∪ | supplementary vocabulary |
//! | 5 | ∖ | keywords owned by a dedicated region rule |
//!
//! All sets are [`BTreeSet`]s, so the result never depends on input order.

use std::collections::BTreeSet;

/// Flow and declaration constructs, highlighted as `keyword.control`.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "cfgpmtr", "dimension", "despmtr", "outpmtr", "udparg", "udprim", "store", "restore",
    "extrude", "set", "mark", "select", "translate", "rotate", "scale", "union", "subtract",
    "intersect", "fillet", "chamfer", "sweep", "revolve", "loft", "blend", "pathrule", "import",
    "catbeg", "catend", "ifthen", "elseif", "else", "endif", "foreach", "endfor", "while",
    "endwhile", "break", "continue", "throw", "try", "catch", "endtry",
];

/// Expression-level built-ins, matched case-sensitively.
pub const FUNCTION_KEYWORDS: &[&str] = &[
    "abs", "acos", "asin", "atan", "atan2", "ceil", "cos", "cosh", "exp", "floor", "log",
    "log10", "max", "min", "mod", "pow", "random", "round", "sign", "sin", "sinh", "sqrt", "tan",
    "tanh", "trim", "patbeg", "patend", "dump", "val2str", "str2val", "getattr", "setattr",
    "applycsys", "evaluate", "getbbox", "getlength", "getarea", "getvolume", "getmomnt", "getcg",
    "split", "join", "mirror", "hollow", "thicken", "extract", "rule", "attribute", "cfgpmtr",
    "interface", "point", "line", "spline", "cirarc", "ellipse", "parabola", "hyperbola", "box",
    "cylinder", "sphere", "cone", "torus", "ruled", "revolved",
];

/// Statement names that appear in `.csm` files but are not covered by the
/// control or function lists.
pub const SUPPLEMENTARY_VOCABULARY: &[&str] = &[
    "node", "wire", "sheet", "solid", "a", "end", "arc", "assert", "bezier", "combine",
    "connect", "conpmtr", "csystem", "group", "lbound", "linseg", "macbeg", "message", "name",
    "patbreak", "project", "recall", "reorder", "rotatex", "rotatey", "rotatez", "skbeg",
    "skcon", "skend", "skvar", "solbeg", "solcon", "sslope", "ubound",
];

/// Which catalog set a keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Control,
    Function,
    Supplementary,
}

/// Curated keyword sets.
///
/// # Examples
///
/// ```
/// use csm_docs_grammar::{KeywordCatalog, KeywordKind};
///
/// let mut catalog = KeywordCatalog::builtin();
/// assert!(catalog.control().contains("ifthen"));
///
/// catalog.extend(KeywordKind::Control, ["MACEND"]);
/// assert!(catalog.control().contains("macend"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordCatalog {
    control: BTreeSet<String>,
    function: BTreeSet<String>,
    supplementary: BTreeSet<String>,
}

impl KeywordCatalog {
    /// Catalog with no keywords.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in CSM vocabularies.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.extend(KeywordKind::Control, CONTROL_KEYWORDS.iter().copied());
        catalog.extend(KeywordKind::Function, FUNCTION_KEYWORDS.iter().copied());
        catalog.extend(
            KeywordKind::Supplementary,
            SUPPLEMENTARY_VOCABULARY.iter().copied(),
        );
        catalog
    }

    /// Adds keywords to one set. Entries are trimmed and case-folded to
    /// lowercase; empty entries are ignored.
    pub fn extend<I, S>(&mut self, kind: KeywordKind, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = match kind {
            KeywordKind::Control => &mut self.control,
            KeywordKind::Function => &mut self.function,
            KeywordKind::Supplementary => &mut self.supplementary,
        };
        set.extend(
            words
                .into_iter()
                .map(|word| word.as_ref().trim().to_ascii_lowercase())
                .filter(|word| !word.is_empty()),
        );
    }

    pub fn control(&self) -> &BTreeSet<String> {
        &self.control
    }

    pub fn function(&self) -> &BTreeSet<String> {
        &self.function
    }

    pub fn supplementary(&self) -> &BTreeSet<String> {
        &self.supplementary
    }

    /// Every known command: control ∪ function ∪ `command_names` (case-folded)
    /// ∪ supplementary.
    pub fn all_commands<'a>(
        &self,
        command_names: impl IntoIterator<Item = &'a str>,
    ) -> BTreeSet<String> {
        let mut all: BTreeSet<String> = self
            .control
            .iter()
            .chain(&self.function)
            .chain(&self.supplementary)
            .cloned()
            .collect();
        all.extend(
            command_names
                .into_iter()
                .map(|name| name.trim().to_ascii_lowercase())
                .filter(|name| !name.is_empty()),
        );
        all
    }

    /// [`all_commands`](Self::all_commands) minus `excluded` (compared
    /// case-insensitively).
    ///
    /// # Examples
    ///
    /// ```
    /// use csm_docs_grammar::KeywordCatalog;
    ///
    /// let catalog = KeywordCatalog::builtin();
    /// let calls = catalog.function_call_commands(["SKETCH"], &["udprim"]);
    /// assert!(calls.contains("sketch"));
    /// assert!(calls.contains("extrude"));
    /// assert!(!calls.contains("udprim"));
    /// ```
    pub fn function_call_commands<'a>(
        &self,
        command_names: impl IntoIterator<Item = &'a str>,
        excluded: &[&str],
    ) -> BTreeSet<String> {
        let excluded: BTreeSet<String> = excluded
            .iter()
            .map(|word| word.to_ascii_lowercase())
            .collect();
        self.all_commands(command_names)
            .difference(&excluded)
            .cloned()
            .collect()
    }
}

/// Parses a keyword list file: one keyword per line, blank lines and lines
/// starting with `#` ignored.
///
/// # Examples
///
/// ```
/// use csm_docs_grammar::parse_keyword_list;
///
/// let words = parse_keyword_list("# extra statements\nSKBEG\n\n  skend  \n");
/// assert_eq!(words, vec!["skbeg", "skend"]);
/// ```
pub fn parse_keyword_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_ascii_lowercase)
        .collect()
}
