//! Regular-expression fragments built from keyword lists.
//!
//! The target tokenizer gets no global case-insensitivity flag, so
//! case-insensitive keywords are compiled into per-character classes
//! (`box` → `[bB][oO][xX]`).

/// Placeholder emitted for an empty keyword set. It only matches its own
/// literal text, which never occurs in CSM input.
pub fn never_matches(label: &str) -> String {
    format!("__NO_{}__", label.to_ascii_uppercase())
}

/// Compiles one keyword into a case-insensitive fragment. ASCII letters become
/// two-case character classes; everything else is escaped literally.
///
/// # Examples
///
/// ```
/// use csm_docs_grammar::case_insensitive_literal;
///
/// assert_eq!(case_insensitive_literal("box"), "[bB][oO][xX]");
/// assert_eq!(case_insensitive_literal("log10"), "[lL][oO][gG]10");
/// assert_eq!(case_insensitive_literal("a.b"), r"[aA]\.[bB]");
/// ```
pub fn case_insensitive_literal(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len() * 4);
    for ch in keyword.chars() {
        if ch.is_ascii_alphabetic() {
            out.push('[');
            out.push(ch.to_ascii_lowercase());
            out.push(ch.to_ascii_uppercase());
            out.push(']');
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
        }
    }
    out
}

/// De-duplicates keywords and orders them longest first, then
/// lexicographically, so a keyword is always tried before its prefixes.
///
/// # Examples
///
/// ```
/// use csm_docs_grammar::ordered_alternatives;
///
/// let ordered = ordered_alternatives(["set", "select", "sin", "set"]);
/// assert_eq!(ordered, vec!["select", "set", "sin"]);
/// ```
pub fn ordered_alternatives<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut ordered: Vec<&str> = words.into_iter().filter(|w| !w.is_empty()).collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    ordered.dedup();
    ordered
}

/// Non-capturing alternation of case-insensitive fragments, without anchors:
/// `(?:[aA]|[bB][cC])`.
pub fn case_insensitive_group<'a>(
    words: impl IntoIterator<Item = &'a str>,
    empty_label: &str,
) -> String {
    group(
        ordered_alternatives(words)
            .into_iter()
            .map(case_insensitive_literal),
        empty_label,
    )
}

/// Case-insensitive alternation wrapped in word boundaries.
///
/// # Examples
///
/// ```
/// use csm_docs_grammar::case_insensitive_alternation;
///
/// assert_eq!(
///     case_insensitive_alternation(["if", "else"], "control"),
///     r"\b(?:[eE][lL][sS][eE]|[iI][fF])\b"
/// );
/// assert_eq!(case_insensitive_alternation(Vec::<&str>::new(), "control"), "__NO_CONTROL__");
/// ```
pub fn case_insensitive_alternation<'a>(
    words: impl IntoIterator<Item = &'a str>,
    empty_label: &str,
) -> String {
    bounded(case_insensitive_group(words, empty_label), empty_label)
}

/// Case-sensitive alternation wrapped in word boundaries.
///
/// # Examples
///
/// ```
/// use csm_docs_grammar::literal_alternation;
///
/// assert_eq!(literal_alternation(["sin", "asin"], "functions"), r"\b(?:asin|sin)\b");
/// ```
pub fn literal_alternation<'a>(
    words: impl IntoIterator<Item = &'a str>,
    empty_label: &str,
) -> String {
    let inner = group(
        ordered_alternatives(words).into_iter().map(regex::escape),
        empty_label,
    );
    bounded(inner, empty_label)
}

fn group(fragments: impl Iterator<Item = String>, empty_label: &str) -> String {
    let fragments: Vec<String> = fragments.collect();
    if fragments.is_empty() {
        return never_matches(empty_label);
    }
    format!("(?:{})", fragments.join("|"))
}

fn bounded(inner: String, empty_label: &str) -> String {
    if inner == never_matches(empty_label) {
        return inner;
    }
    format!(r"\b{inner}\b")
}
